//! Line-oriented tray control protocol.
//!
//! One command per line. A line splits once on the first `=` into a verb
//! and an argument; argument lists split on `|` with bounded arity, so the
//! last field may itself contain `|`.

use anyhow::{anyhow, Result};

use crate::ui::icon::{self, IconData};

/// A parsed protocol command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Set the icon title
    SetTitle(String),
    /// Set the icon tooltip
    SetTooltip(String),
    /// Set the icon image
    SetIcon(IconData),
    /// Add a menu item registered under `id`
    MenuAdd {
        id: String,
        label: String,
        tooltip: Option<String>,
    },
    /// Add a quit menu item, registered under `quit`
    MenuAddQuit {
        label: String,
        tooltip: Option<String>,
    },
    /// Append a menu separator
    MenuAddSeparator,
    /// Hide the item registered under the identifier
    MenuHide(String),
    /// Show the item registered under the identifier
    MenuShow(String),
    /// Set an image on the item registered under `id`
    MenuIcon { id: String, icon: IconData },
}

/// Parse one protocol line.
///
/// Icon sources are resolved here, so a bad file path or base64 payload
/// fails together with the line that carried it. Callers skip blank lines
/// before parsing.
pub fn parse(line: &str) -> Result<Command> {
    let (verb, arg) = match line.split_once('=') {
        Some((verb, arg)) => (verb, Some(arg)),
        None => (line, None),
    };

    match verb {
        // The separator takes no argument; accept a stray one.
        "menu_add_separator" => Ok(Command::MenuAddSeparator),

        "title" => Ok(Command::SetTitle(required(arg, line)?.to_string())),
        "tooltip" => Ok(Command::SetTooltip(required(arg, line)?.to_string())),
        "icon" => Ok(Command::SetIcon(icon::from_source(required(arg, line)?)?)),

        "menu_add" => {
            let mut fields = required(arg, line)?.splitn(3, '|');
            let id = fields.next().unwrap_or_default().to_string();
            let label = fields.next().map(str::to_string);
            let tooltip = fields.next().map(str::to_string);
            Ok(Command::MenuAdd {
                label: label.unwrap_or_else(|| id.clone()),
                id,
                tooltip,
            })
        }
        "menu_add_quit" => {
            let mut fields = required(arg, line)?.splitn(2, '|');
            let label = fields.next().unwrap_or_default().to_string();
            let tooltip = fields.next().map(str::to_string);
            Ok(Command::MenuAddQuit { label, tooltip })
        }
        "menu_hide" => Ok(Command::MenuHide(required(arg, line)?.to_string())),
        "menu_show" => Ok(Command::MenuShow(required(arg, line)?.to_string())),
        "menu_icon" => {
            let (id, source) = required(arg, line)?
                .split_once('|')
                .ok_or_else(|| anyhow!("Invalid number of arguments: {}", line))?;
            Ok(Command::MenuIcon {
                id: id.to_string(),
                icon: icon::from_source(source)?,
            })
        }

        _ => Err(anyhow!("Invalid command: {}", line)),
    }
}

fn required<'a>(arg: Option<&'a str>, line: &str) -> Result<&'a str> {
    arg.ok_or_else(|| anyhow!("Invalid command: {}", line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine};

    #[test]
    fn test_title_and_tooltip() {
        assert_eq!(
            parse("title=My App").unwrap(),
            Command::SetTitle("My App".to_string())
        );
        assert_eq!(
            parse("tooltip=status: idle").unwrap(),
            Command::SetTooltip("status: idle".to_string())
        );
        // An empty value is legal.
        assert_eq!(parse("title=").unwrap(), Command::SetTitle(String::new()));
    }

    #[test]
    fn test_menu_add_arities() {
        assert_eq!(
            parse("menu_add=open").unwrap(),
            Command::MenuAdd {
                id: "open".to_string(),
                label: "open".to_string(),
                tooltip: None,
            }
        );
        assert_eq!(
            parse("menu_add=open|Open File").unwrap(),
            Command::MenuAdd {
                id: "open".to_string(),
                label: "Open File".to_string(),
                tooltip: None,
            }
        );
        assert_eq!(
            parse("menu_add=open|Open File|Opens a file").unwrap(),
            Command::MenuAdd {
                id: "open".to_string(),
                label: "Open File".to_string(),
                tooltip: Some("Opens a file".to_string()),
            }
        );
    }

    #[test]
    fn test_menu_add_keeps_delimiter_in_last_field() {
        // Bounded splitting: the tooltip may contain the delimiter.
        assert_eq!(
            parse("menu_add=a|b|c|d").unwrap(),
            Command::MenuAdd {
                id: "a".to_string(),
                label: "b".to_string(),
                tooltip: Some("c|d".to_string()),
            }
        );
    }

    #[test]
    fn test_menu_add_quit_arities() {
        assert_eq!(
            parse("menu_add_quit=Quit").unwrap(),
            Command::MenuAddQuit {
                label: "Quit".to_string(),
                tooltip: None,
            }
        );
        assert_eq!(
            parse("menu_add_quit=Quit|Exit the program").unwrap(),
            Command::MenuAddQuit {
                label: "Quit".to_string(),
                tooltip: Some("Exit the program".to_string()),
            }
        );
    }

    #[test]
    fn test_separator_with_and_without_argument() {
        assert_eq!(parse("menu_add_separator").unwrap(), Command::MenuAddSeparator);
        assert_eq!(parse("menu_add_separator=").unwrap(), Command::MenuAddSeparator);
    }

    #[test]
    fn test_menu_hide_and_show() {
        assert_eq!(
            parse("menu_hide=open").unwrap(),
            Command::MenuHide("open".to_string())
        );
        assert_eq!(
            parse("menu_show=open").unwrap(),
            Command::MenuShow("open".to_string())
        );
    }

    #[test]
    fn test_icon_from_base64() {
        let image = image::RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 0, 255]));
        let mut bytes = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(image)
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();
        let payload = STANDARD.encode(bytes.into_inner());

        match parse(&format!("icon=b64:{}", payload)).unwrap() {
            Command::SetIcon(icon) => assert_eq!((icon.width, icon.height), (1, 1)),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_icon_from_missing_file() {
        assert!(parse("icon=/no/such/icon.ico").is_err());
    }

    #[test]
    fn test_menu_icon_requires_two_fields() {
        assert!(parse("menu_icon=open").is_err());
    }

    #[test]
    fn test_invalid_commands() {
        assert!(parse("title").is_err());
        assert!(parse("frobnicate=1").is_err());
        assert!(parse("menu_add").is_err());
    }
}
