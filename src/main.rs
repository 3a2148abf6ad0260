mod alloc;
mod builder;
mod cli;
mod dirent;
mod error;
mod freelist;
mod image;
mod layout;
mod prompt;
mod superblock;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Args;
use std::fs::OpenOptions;
use std::io::{self, BufRead, Write};

use builder::BuildOptions;
use prompt::Confirmation;

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .format_timestamp(None)
        .format_target(false)
        .init();

    run(&args, io::stdin().lock(), io::stdout())
}

/// Build the image described by `args`, asking on `input`/`output` before
/// replacing an existing file.
fn run(args: &Args, input: impl BufRead, mut output: impl Write) -> Result<()> {
    // Validate everything before an existing image can be truncated.
    let options = BuildOptions::new(args.nblocks, &args.entry_to_skip, args.sorted)?;
    builder::check_root(&args.rootdir)?;

    if args.imagepath.exists() && !args.skip_prompt {
        let answer =
            prompt::confirm(input, &mut output).context("Failed to read confirmation")?;
        if answer == Confirmation::Aborted {
            writeln!(output, "Wrong passphrase! Bye!")?;
            return Ok(());
        }
    }

    let mut image = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&args.imagepath)
        .with_context(|| format!("Failed to create image {:?}", args.imagepath))?;

    builder::build_image(&mut image, &args.rootdir, &options).with_context(|| {
        format!(
            "Failed to build image {:?} from {:?}",
            args.imagepath, args.rootdir
        )
    })?;
    image.sync_all().context("Failed to sync image")?;

    writeln!(output, "bye!")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    const OLD_IMAGE: &[u8] = b"previous image contents";

    struct Fixture {
        temp: TempDir,
    }

    impl Fixture {
        /// A root with one file and an already existing image.
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            fs::create_dir(temp.path().join("root")).unwrap();
            fs::write(temp.path().join("root/hello"), b"hello").unwrap();
            fs::write(temp.path().join("fs.img"), OLD_IMAGE).unwrap();
            Fixture { temp }
        }

        fn path(&self, name: &str) -> String {
            self.temp.path().join(name).to_string_lossy().into_owned()
        }

        fn image(&self) -> Vec<u8> {
            fs::read(self.temp.path().join("fs.img")).unwrap()
        }

        fn run(&self, extra: &[&str], answer: &str) -> (Result<()>, String) {
            let mut argv = vec!["simfs-mkfs".to_string(), self.path("root"), self.path("fs.img")];
            argv.extend(["--nblocks", "16"].map(String::from));
            argv.extend(extra.iter().map(|s| s.to_string()));
            let args = Args::try_parse_from(argv).unwrap();

            let mut output = Vec::new();
            let result = run(&args, answer.as_bytes(), &mut output);
            (result, String::from_utf8(output).unwrap())
        }
    }

    #[test]
    fn test_wrong_passphrase_leaves_image_untouched() {
        let fx = Fixture::new();
        let (result, output) = fx.run(&[], "nope\n");
        result.unwrap();
        assert!(output.contains("'GOGOGO'"));
        assert!(output.ends_with("Wrong passphrase! Bye!\n"));
        assert_eq!(fx.image(), OLD_IMAGE);
    }

    #[test]
    fn test_invalid_pattern_rejected_before_truncating() {
        let fx = Fixture::new();
        let (result, output) = fx.run(&["--entry-to-skip", "(", "--skip-prompt"], "");
        assert!(result.is_err());
        assert!(output.is_empty());
        assert_eq!(fx.image(), OLD_IMAGE);
    }

    #[test]
    fn test_missing_root_rejected_before_truncating() {
        let fx = Fixture::new();
        fs::remove_dir_all(fx.temp.path().join("root")).unwrap();
        let (result, _) = fx.run(&["--skip-prompt"], "");
        assert!(result.is_err());
        assert_eq!(fx.image(), OLD_IMAGE);
    }

    #[test]
    fn test_passphrase_rebuilds_image() {
        let fx = Fixture::new();
        let (result, output) = fx.run(&[], "GOGOGO\n");
        result.unwrap();
        assert!(output.ends_with("bye!\n"));

        let image = fx.image();
        assert_eq!(image.len(), 16 * layout::BLOCK_SIZE);
        assert_eq!(&image[132..136], &16u32.to_le_bytes());
    }

    #[test]
    fn test_new_image_needs_no_confirmation() {
        let fx = Fixture::new();
        fs::remove_file(fx.temp.path().join("fs.img")).unwrap();
        let (result, output) = fx.run(&[], "");
        result.unwrap();
        assert_eq!(output, "bye!\n");
        assert!(Path::new(&fx.path("fs.img")).is_file());
    }
}
