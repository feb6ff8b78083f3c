//! Command-line argument parsing and processing.
//!
//! This module handles parsing of command-line arguments and provides a clean
//! interface for the main application logic. It supports the standard help,
//! version, and debug flags while gracefully handling unknown options.

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the daemon with these settings
    Run {
        debug_enabled: bool,
        /// Path to circadian.toml (schedule configuration)
        circadian_path: Option<String>,
        /// Path the live alacritty.toml is read from at startup
        alacritty_source: Option<String>,
        /// Path the merged configuration is written to on each switch
        alacritty_dest: Option<String>,
    },
    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// # Arguments
    /// * `args` - Iterator over command-line arguments (typically from std::env::args())
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut debug_enabled = false;
        let mut display_help = false;
        let mut display_version = false;
        let mut unknown_arg_found = false;
        let mut circadian_path: Option<String> = None;
        let mut alacritty_source: Option<String> = None;
        let mut alacritty_dest: Option<String> = None;

        let mut iter = args.into_iter().skip(1).peekable();
        while let Some(arg) = iter.next() {
            match arg.as_ref() {
                "-h" | "--help" => display_help = true,
                "-V" | "--version" => display_version = true,
                "--debug" => debug_enabled = true,
                "-c" | "--circadian-path" => match iter.next() {
                    Some(value) => circadian_path = Some(value.as_ref().to_string()),
                    None => unknown_arg_found = true,
                },
                "-s" | "--alacritty-source" => match iter.next() {
                    Some(value) => alacritty_source = Some(value.as_ref().to_string()),
                    None => unknown_arg_found = true,
                },
                "-d" | "--alacritty-dest" => match iter.next() {
                    Some(value) => alacritty_dest = Some(value.as_ref().to_string()),
                    None => unknown_arg_found = true,
                },
                _ => unknown_arg_found = true,
            }
        }

        let action = if unknown_arg_found {
            CliAction::ShowHelpDueToError
        } else if display_help {
            CliAction::ShowHelp
        } else if display_version {
            CliAction::ShowVersion
        } else {
            CliAction::Run {
                debug_enabled,
                circadian_path,
                alacritty_source,
                alacritty_dest,
            }
        };

        ParsedArgs { action }
    }
}

/// Display help information.
pub fn display_help_message() {
    log_version!();
    log_block_start!("Usage: circadianr [OPTIONS]");
    log_indented!("-c, --circadian-path <PATH>    Location of circadian.toml");
    log_indented!("-s, --alacritty-source <PATH>  alacritty.toml read at startup");
    log_indented!("-d, --alacritty-dest <PATH>    alacritty.toml written on each switch");
    log_indented!("--debug                        Show detailed scheduling operations");
    log_indented!("-h, --help                     Print help");
    log_indented!("-V, --version                  Print version");
    log_block_start!("Change your alacritty theme by time of day or solar events.");
    log_indented!("Defaults resolve under $XDG_CONFIG_HOME/alacritty/");
    log_end!();
}

/// Display version information.
pub fn display_version_message() {
    log_version!();
    log_block_start!("Automatic Alacritty theme switching by time of day");
    log_indented!("https://github.com/psi4j/circadianr");
    log_end!();
}
