use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;

use chkpwd_brute::{AttackConfig, CasingMode};

#[derive(Parser, Debug)]
#[command(name = "chkpwd-brute")]
#[command(version)]
#[command(about = "Dictionary attack against the local unix_chkpwd helper - Educational use only", long_about = None)]
pub struct Args {
    /// Path to the dictionary file (one password per line)
    #[arg(short = 'd', long = "dict", value_name = "DICTIONARY")]
    pub dict: PathBuf,

    /// Try every upper/lower casing of each entry (slow)
    #[arg(short = 'c', long)]
    pub casing: bool,

    /// Path to unix_chkpwd (default: search PATH and sbin directories)
    #[arg(long, value_name = "PATH")]
    pub helper: Option<PathBuf>,

    /// Permission bits of the FIFO, in octal
    #[arg(long, value_name = "OCTAL", default_value = "600")]
    pub fifo_mode: String,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn to_config(&self) -> Result<AttackConfig> {
        Ok(AttackConfig {
            dictionary: self.dict.clone(),
            casing: CasingMode::from_flag(self.casing),
            helper: self.helper.clone(),
            fifo_mode: parse_mode(&self.fifo_mode)?,
        })
    }
}

fn parse_mode(value: &str) -> Result<u32> {
    let mode = u32::from_str_radix(value.trim_start_matches("0o"), 8)
        .map_err(|e| anyhow!("Invalid FIFO mode \"{}\": {}", value, e))?;
    if mode & !0o777 != 0 {
        return Err(anyhow!("Invalid FIFO mode \"{}\": only permission bits allowed", value));
    }
    if mode & 0o600 != 0o600 {
        return Err(anyhow!("Invalid FIFO mode \"{}\": owner needs read and write", value));
    }
    Ok(mode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chkpwd_brute::DEFAULT_FIFO_MODE;

    #[test]
    fn test_parse_flags() {
        let args = Args::try_parse_from(["chkpwd-brute", "-d", "words.txt", "-c"]).unwrap();
        let config = args.to_config().unwrap();

        assert_eq!(config.dictionary, PathBuf::from("words.txt"));
        assert_eq!(config.casing, CasingMode::AllCasings);
        assert_eq!(config.fifo_mode, DEFAULT_FIFO_MODE);
        assert!(config.helper.is_none());
    }

    #[test]
    fn test_dictionary_required() {
        assert!(Args::try_parse_from(["chkpwd-brute", "-c"]).is_err());
    }

    #[test]
    fn test_fifo_mode() {
        assert_eq!(parse_mode("777").unwrap(), 0o777);
        assert_eq!(parse_mode("0o640").unwrap(), 0o640);
        assert!(parse_mode("400").is_err());
        assert!(parse_mode("4777").is_err());
        assert!(parse_mode("abc").is_err());
    }
}
