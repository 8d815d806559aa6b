use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tray_icon::{
    menu::{IconMenuItem, Menu, MenuEvent, MenuId, PredefinedMenuItem},
    TrayIcon, TrayIconBuilder,
};

use crate::command::Command;
use crate::ui::icon;

/// Callback handler for menu item activations.
pub trait MenuCallback: Send + Sync {
    /// A regular menu item was clicked.
    fn on_item_selected(&self, id: &str);
    /// A quit menu item was clicked.
    fn on_quit(&self);
}

/// One appended menu entry, in append order.
///
/// Hidden items are removed from the toolkit menu but keep their slot here,
/// so a later `menu_show` can re-insert them at the right position.
enum MenuEntry {
    Item {
        item: IconMenuItem,
        visible: bool,
        quit: bool,
    },
    Separator(PredefinedMenuItem),
}

impl MenuEntry {
    fn is_visible(&self) -> bool {
        match self {
            MenuEntry::Item { visible, .. } => *visible,
            MenuEntry::Separator(_) => true,
        }
    }
}

/// Cross-platform system tray driven by protocol commands.
///
/// Owns the toolkit handles and the identifier map. Not `Send`: it lives on
/// the thread that runs the platform event loop, and commands reach it
/// through a channel.
pub struct TrayApp {
    tray_icon: TrayIcon,
    menu: Menu,
    entries: Vec<MenuEntry>,
    /// Identifier map: latest entry added under each identifier.
    index: HashMap<String, usize>,
    quit_seq: u32,
    callback: Arc<dyn MenuCallback>,
}

impl TrayApp {
    /// Create the tray icon with the built-in default image and an empty menu.
    pub fn new(callback: Arc<dyn MenuCallback>) -> Result<Self> {
        let menu = Menu::new();

        let tray_icon = TrayIconBuilder::new()
            .with_menu(Box::new(menu.clone()))
            .with_icon(icon::default_icon().into_tray_icon()?)
            .build()
            .context("Failed to create the tray icon")?;

        Ok(Self {
            tray_icon,
            menu,
            entries: Vec::new(),
            index: HashMap::new(),
            quit_seq: 0,
            callback,
        })
    }

    /// Apply one parsed command to the tray.
    pub fn apply(&mut self, command: Command) -> Result<()> {
        match command {
            Command::SetTitle(title) => self.tray_icon.set_title(Some(title)),
            Command::SetTooltip(tooltip) => self
                .tray_icon
                .set_tooltip(Some(tooltip))
                .context("Failed to set the icon tooltip")?,
            Command::SetIcon(data) => self
                .tray_icon
                .set_icon(Some(data.into_tray_icon()?))
                .context("Failed to set the icon image")?,

            Command::MenuAdd { id, label, tooltip } => {
                drop_item_tooltip(tooltip);
                let item = IconMenuItem::with_id(id.as_str(), &label, true, None, None);
                self.append_item(id, item, false)?;
            }
            Command::MenuAddQuit { label, tooltip } => {
                drop_item_tooltip(tooltip);
                // Quit items get a private toolkit id so a regular item
                // registered as `quit` still just prints its identifier.
                self.quit_seq += 1;
                let toolkit_id = format!("quit#{}", self.quit_seq);
                let item = IconMenuItem::with_id(toolkit_id.as_str(), &label, true, None, None);
                self.append_item("quit".to_string(), item, true)?;
            }
            Command::MenuAddSeparator => {
                let separator = PredefinedMenuItem::separator();
                self.menu
                    .append(&separator)
                    .context("Failed to append a menu separator")?;
                self.entries.push(MenuEntry::Separator(separator));
            }

            Command::MenuHide(id) => self.set_item_visible(&id, false)?,
            Command::MenuShow(id) => self.set_item_visible(&id, true)?,
            Command::MenuIcon { id, icon } => {
                let idx = *self
                    .index
                    .get(id.as_str())
                    .ok_or_else(|| anyhow!("Menu item not found: {}", id))?;
                if let MenuEntry::Item { item, .. } = &self.entries[idx] {
                    item.set_icon(Some(icon.into_menu_icon()?));
                }
            }
        }

        Ok(())
    }

    fn append_item(&mut self, id: String, item: IconMenuItem, quit: bool) -> Result<()> {
        self.menu
            .append(&item)
            .context("Failed to append a menu item")?;
        self.entries.push(MenuEntry::Item {
            item,
            visible: true,
            quit,
        });
        // Latest addition wins for hide/show/icon addressing.
        self.index.insert(id, self.entries.len() - 1);
        Ok(())
    }

    /// Hide or show the item registered under the identifier.
    ///
    /// Unknown identifiers are a no-op; repeated hides and shows are
    /// idempotent.
    fn set_item_visible(&mut self, id: &str, show: bool) -> Result<()> {
        let Some(&idx) = self.index.get(id) else {
            log::debug!("No menu item registered under {:?}", id);
            return Ok(());
        };

        let position = insert_position(self.entries[..idx].iter().map(MenuEntry::is_visible));
        if let MenuEntry::Item { item, visible, .. } = &mut self.entries[idx] {
            if *visible == show {
                return Ok(());
            }
            if show {
                self.menu
                    .insert(&*item, position)
                    .context("Failed to re-insert a menu item")?;
            } else {
                self.menu
                    .remove(&*item)
                    .context("Failed to remove a menu item")?;
            }
            *visible = show;
        }
        Ok(())
    }

    /// Process pending menu events (call this from the event loop).
    pub fn process_events(&self) {
        while let Ok(event) = MenuEvent::receiver().try_recv() {
            self.dispatch(&event.id);
        }
    }

    fn dispatch(&self, id: &MenuId) {
        let is_quit = self.entries.iter().any(|entry| {
            matches!(entry, MenuEntry::Item { item, quit: true, .. } if item.id() == id)
        });

        if is_quit {
            self.callback.on_quit();
        } else {
            self.callback.on_item_selected(id.0.as_str());
        }
    }
}

fn drop_item_tooltip(tooltip: Option<String>) {
    // The platform menu has no per-item tooltip; the field exists for
    // protocol compatibility.
    if let Some(tooltip) = tooltip {
        log::debug!("Menu item tooltips are not rendered, dropping {:?}", tooltip);
    }
}

/// Toolkit position for re-inserting an entry: the number of visible
/// entries in front of it.
fn insert_position(preceding_visible: impl Iterator<Item = bool>) -> usize {
    preceding_visible.filter(|visible| *visible).count()
}
