use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "simfs-mkfs",
    about = "Format a simfs filesystem image from a host directory",
    long_about = "Format a simfs filesystem image from a host directory. \
                  The image uses 4096-byte blocks; block 0 is the superblock."
)]
pub struct Args {
    /// The root directory for the file system
    pub rootdir: PathBuf,

    /// The path of the fs image to create
    pub imagepath: PathBuf,

    /// Number of 4096-byte blocks in the image (default is a 16 MiB image)
    #[arg(long = "nblocks", default_value_t = 4096, value_parser = clap::value_parser!(u32).range(1..))]
    pub nblocks: u32,

    /// Leave out entries whose name matches this regular expression (unanchored)
    #[arg(long = "entry-to-skip", value_name = "REGEX", default_value = "")]
    pub entry_to_skip: String,

    /// Overwrite an existing image without asking for confirmation
    #[arg(long = "skip-prompt")]
    pub skip_prompt: bool,

    /// Sort directory entries by name so the image is reproducible
    #[arg(long = "sorted")]
    pub sorted: bool,

    /// Verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["simfs-mkfs", "root", "fs.img"]).unwrap();
        assert_eq!(args.rootdir, PathBuf::from("root"));
        assert_eq!(args.imagepath, PathBuf::from("fs.img"));
        assert_eq!(args.nblocks, 4096);
        assert_eq!(args.entry_to_skip, "");
        assert!(!args.skip_prompt);
        assert!(!args.sorted);
        assert!(!args.verbose);
    }

    #[test]
    fn test_all_flags() {
        let args = Args::try_parse_from([
            "simfs-mkfs",
            "root",
            "fs.img",
            "--nblocks",
            "16",
            "--entry-to-skip",
            r"\.o$",
            "--skip-prompt",
            "--sorted",
            "-v",
        ])
        .unwrap();
        assert_eq!(args.nblocks, 16);
        assert_eq!(args.entry_to_skip, r"\.o$");
        assert!(args.skip_prompt && args.sorted && args.verbose);
    }

    #[test]
    fn test_rejects_bad_block_counts() {
        assert!(Args::try_parse_from(["simfs-mkfs", "r", "i", "--nblocks", "0"]).is_err());
        assert!(Args::try_parse_from(["simfs-mkfs", "r", "i", "--nblocks", "-1"]).is_err());
        assert!(Args::try_parse_from(["simfs-mkfs", "r", "i", "--nblocks", "4294967296"]).is_err());
        assert!(Args::try_parse_from(["simfs-mkfs", "r"]).is_err());
    }
}
