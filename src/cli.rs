use clap::Parser;

const COMMANDS_HELP: &str = "\
Commands:
  title=TITLE                      Set the icon title
  tooltip=TOOLTIP                  Set the icon tooltip
  icon=(b64:BASE64|FILE)           Set the icon image
  menu_add=ID|LABEL|TOOLTIP        Add a menu item
  menu_add_quit=LABEL|TOOLTIP      Add a quit menu item (registered as `quit`)
  menu_add_separator               Add a menu separator
  menu_hide=ID                     Hide a menu item
  menu_show=ID                     Show a menu item
  menu_icon=ID|(b64:BASE64|FILE)   Set an icon on a menu item";

/// Command-line interface for tray-control
#[derive(Debug, Parser)]
#[command(name = "tray-control")]
#[command(about = "Create a system tray icon as defined by the commands received \
from the standard input and print the selected menu item IDs to the standard output")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(after_help = COMMANDS_HELP)]
pub struct Cli {
    /// Do not read commands from standard input
    #[arg(short = 'n', long)]
    pub no_stdin: bool,

    /// Commands applied at startup, after any configuration file defaults
    #[arg(value_name = "COMMAND")]
    pub commands: Vec<String>,
}
