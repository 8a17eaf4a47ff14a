//! Command line arguments
//!
//! Flags map onto an immutable `ConversionJob` and `EncodingProfile` that are
//! built once before the run starts.

use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use crate::conversion::FFMPEG_ENV;
use crate::core::{ConversionJob, LayoutPolicy, MetadataMode};
use crate::profiles::{load_profile, Codec, EncodingProfile, OpusApplication, ProfileError, TargetFormat};

#[derive(Parser, Debug)]
#[command(name = "audio-converter", version)]
#[command(about = "Batch-converts audio files to another format using ffmpeg")]
pub struct Args {
    /// Input audio file or directory
    pub input: Option<PathBuf>,

    /// Output file or directory (default: next to the input)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Target format
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<TargetFormat>,

    /// Codec (must be allowed for the target format)
    #[arg(short = 'c', long, value_enum)]
    pub codec: Option<Codec>,

    /// Bitrate such as 128k (ogg, opus, mp3, m4a)
    #[arg(short = 'b', long)]
    pub bitrate: Option<String>,

    /// FLAC compression level, 0-12
    #[arg(long)]
    pub quality: Option<u8>,

    /// Opus encoder complexity, 0-10
    #[arg(long)]
    pub complexity: Option<u8>,

    /// Opus application hint
    #[arg(long, value_enum)]
    pub application: Option<OpusApplication>,

    /// AAC lowpass cutoff in Hz
    #[arg(long)]
    pub cutoff: Option<u32>,

    /// Descend into subdirectories (default)
    #[arg(long, overrides_with = "no_recursive")]
    recursive: bool,

    /// Only convert files directly inside the input directory
    #[arg(long = "no-recursive", overrides_with = "recursive")]
    no_recursive: bool,

    /// Skip files already in the target format (default)
    #[arg(long, overrides_with = "no_skip_same_format")]
    skip_same_format: bool,

    /// Re-encode files already in the target format
    #[arg(long = "no-skip-same-format", overrides_with = "skip_same_format")]
    no_skip_same_format: bool,

    /// Replace existing output files
    #[arg(short = 'y', long)]
    pub overwrite: bool,

    /// Carry tags and cover art to the output (default)
    #[arg(long, overrides_with = "no_preserve_metadata")]
    preserve_metadata: bool,

    /// Strip all metadata from the output
    #[arg(long = "no-preserve-metadata", overrides_with = "preserve_metadata")]
    no_preserve_metadata: bool,

    /// How metadata reaches the output when preserved
    #[arg(long, value_enum, default_value_t = MetadataMode::Retag)]
    pub metadata_mode: MetadataMode,

    /// Put every output directly in the output directory
    #[arg(long)]
    pub flatten: bool,

    /// Path to the ffmpeg binary
    #[arg(long, env = FFMPEG_ENV)]
    pub ffmpeg: Option<PathBuf>,

    /// Read the encoding profile from a JSON file; other flags override it
    #[arg(short = 'p', long)]
    pub profile: Option<PathBuf>,

    /// Print the effective encoding profile as JSON and exit
    #[arg(long)]
    pub print_profile: bool,

    /// Show debug output
    #[arg(short = 'v', long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show warnings and errors
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

impl Args {
    /// Build the job; a missing input becomes an empty path, rejected at start
    pub fn job(&self) -> ConversionJob {
        let mut job = ConversionJob::new(self.input.clone().unwrap_or_default());
        job.output = self.output.clone();
        job.recursive = !self.no_recursive;
        job.skip_same_format = !self.no_skip_same_format;
        job.overwrite = self.overwrite;
        job.preserve_metadata = !self.no_preserve_metadata;
        job.metadata_mode = self.metadata_mode;
        job.layout = if self.flatten {
            LayoutPolicy::Flatten
        } else {
            LayoutPolicy::Mirror
        };
        job
    }

    /// Build the encoding profile: profile file (or defaults), then flags
    pub fn encoding_profile(&self) -> Result<EncodingProfile, ProfileError> {
        let mut profile = match &self.profile {
            Some(path) => load_profile(path)?,
            None => match self.format {
                Some(format) => EncodingProfile::for_format(format),
                None => EncodingProfile::default(),
            },
        };

        if let Some(format) = self.format {
            if format != profile.format {
                profile = EncodingProfile::for_format(format);
            }
        }

        if let Some(codec) = self.codec {
            profile.codec = Some(codec);
        }
        if let Some(bitrate) = &self.bitrate {
            profile.bitrate = Some(bitrate.clone());
        }
        if let Some(quality) = self.quality {
            profile.quality = Some(quality);
        }
        if let Some(complexity) = self.complexity {
            profile.complexity = Some(complexity);
        }
        if let Some(application) = self.application {
            profile.application = Some(application);
        }
        if let Some(cutoff) = self.cutoff {
            profile.cutoff_hz = Some(cutoff);
        }

        profile.validate()?;
        Ok(profile)
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else if self.quiet {
            LevelFilter::Warn
        } else {
            LevelFilter::Info
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Args {
        let mut full = vec!["audio-converter"];
        full.extend_from_slice(args);
        Args::try_parse_from(full).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["/music"]);
        let job = args.job();

        assert_eq!(job.input, Path::new("/music"));
        assert!(job.recursive);
        assert!(job.skip_same_format);
        assert!(!job.overwrite);
        assert!(job.preserve_metadata);
        assert_eq!(job.layout, LayoutPolicy::Mirror);
        assert_eq!(job.metadata_mode, MetadataMode::Retag);
        assert_eq!(args.encoding_profile().unwrap(), EncodingProfile::default());
        assert_eq!(args.log_level(), LevelFilter::Info);
    }

    #[test]
    fn test_negated_flags() {
        let args = parse(&[
            "/music",
            "--no-recursive",
            "--no-skip-same-format",
            "--no-preserve-metadata",
            "--overwrite",
            "--flatten",
            "-o",
            "/out",
        ]);
        let job = args.job();

        assert!(!job.recursive);
        assert!(!job.skip_same_format);
        assert!(!job.preserve_metadata);
        assert!(job.overwrite);
        assert_eq!(job.layout, LayoutPolicy::Flatten);
        assert_eq!(job.output.as_deref(), Some(Path::new("/out")));
    }

    #[test]
    fn test_last_of_paired_flags_wins() {
        let args = parse(&["/music", "--no-recursive", "--recursive"]);
        assert!(args.job().recursive);
    }

    #[test]
    fn test_missing_input_is_empty_path() {
        let args = parse(&["--print-profile"]);
        assert!(args.job().input.as_os_str().is_empty());
    }

    #[test]
    fn test_format_flag_uses_table_defaults() {
        let args = parse(&["/music", "-f", "mp3"]);
        let profile = args.encoding_profile().unwrap();

        assert_eq!(profile.format, TargetFormat::Mp3);
        assert_eq!(profile.codec(), Codec::Mp3);
        assert_eq!(profile.effective_bitrate().as_deref(), Some("192k"));
    }

    #[test]
    fn test_codec_and_rate_overrides() {
        let args = parse(&["/music", "-f", "ogg", "-c", "vorbis", "-b", "160k"]);
        let profile = args.encoding_profile().unwrap();

        assert_eq!(profile.codec(), Codec::Vorbis);
        assert_eq!(profile.effective_bitrate().as_deref(), Some("160k"));
    }

    #[test]
    fn test_disallowed_codec_rejected() {
        let args = parse(&["/music", "-f", "mp3", "-c", "flac"]);
        assert!(matches!(
            args.encoding_profile(),
            Err(ProfileError::CodecNotAllowed { .. })
        ));
    }

    #[test]
    fn test_flac_quality_out_of_range() {
        let args = parse(&["/music", "-f", "flac", "--quality", "13"]);
        assert!(matches!(
            args.encoding_profile(),
            Err(ProfileError::QualityOutOfRange { .. })
        ));
    }

    #[test]
    fn test_profile_file_then_overrides() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profile.json");
        fs::write(&path, r#"{ "format": "m4a", "bitrate": "192k", "cutoff_hz": 18000 }"#).unwrap();

        let args = parse(&["/music", "--profile", path.to_str().unwrap(), "-b", "320k"]);
        let profile = args.encoding_profile().unwrap();

        assert_eq!(profile.format, TargetFormat::M4a);
        assert_eq!(profile.effective_bitrate().as_deref(), Some("320k"));
        assert_eq!(profile.cutoff_hz, Some(18000));
    }

    #[test]
    fn test_format_flag_replaces_profile_file_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profile.json");
        fs::write(&path, r#"{ "format": "m4a", "bitrate": "192k" }"#).unwrap();

        let args = parse(&["/music", "--profile", path.to_str().unwrap(), "-f", "wav"]);
        let profile = args.encoding_profile().unwrap();

        assert_eq!(profile, EncodingProfile::for_format(TargetFormat::Wav));
    }

    #[test]
    fn test_verbose_and_quiet_conflict() {
        let result = Args::try_parse_from(["audio-converter", "/music", "-v", "-q"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_quiet_level() {
        assert_eq!(parse(&["/music", "-q"]).log_level(), LevelFilter::Warn);
        assert_eq!(parse(&["/music", "-v"]).log_level(), LevelFilter::Debug);
    }
}
