use circadianr::Circadianr;
use circadianr::args::{self, CliAction, ParsedArgs};
use circadianr::{log_error_exit, log_pipe};

fn main() {
    let parsed = ParsedArgs::parse(std::env::args());

    match parsed.action {
        CliAction::ShowHelp => args::display_help_message(),
        CliAction::ShowVersion => args::display_version_message(),
        CliAction::ShowHelpDueToError => {
            args::display_help_message();
            std::process::exit(1);
        }
        CliAction::Run {
            debug_enabled,
            circadian_path,
            alacritty_source,
            alacritty_dest,
        } => {
            let result = Circadianr::from_cli(
                debug_enabled,
                circadian_path,
                alacritty_source,
                alacritty_dest,
            )
            .and_then(|app| app.run());

            if let Err(e) = result {
                log_pipe!();
                log_error_exit!("{:#}", e);
                std::process::exit(1);
            }
        }
    }
}
