//! Modal dialogs. Both block input to the browser window until dismissed.

use std::rc::Rc;

use gtk::prelude::*;

const FAVORITES_TITLE: &str = "Favorites";
const ADD_FAVORITE_TITLE: &str = "Add to Favorites";
const ADD_FAVORITE_HEADER: &str = "Enter site URL:";
const URL_LABEL: &str = "URL:";

/// Lists `favorites`; double-clicking an entry passes it to `on_activate`.
pub fn show_favorites<F>(parent: &impl IsA<gtk::Window>, favorites: &[String], on_activate: F)
where
    F: Fn(String) + 'static,
{
    let list = gtk::ListBox::new();
    list.set_selection_mode(gtk::SelectionMode::Single);
    list.set_activate_on_single_click(false);
    for url in favorites {
        let row = gtk::Label::new(Some(url));
        row.set_xalign(0.0);
        row.set_margin_top(6);
        row.set_margin_bottom(6);
        row.set_margin_start(8);
        row.set_margin_end(8);
        list.append(&row);
    }

    let entries = favorites.to_vec();
    list.connect_row_activated(move |_, row| {
        let selected = usize::try_from(row.index())
            .ok()
            .and_then(|idx| entries.get(idx));
        if let Some(url) = selected {
            on_activate(url.clone());
        }
    });

    let scroller = gtk::ScrolledWindow::builder()
        .child(&list)
        .min_content_height(240)
        .vexpand(true)
        .build();

    let ok = gtk::Button::with_label("OK");
    ok.set_halign(gtk::Align::End);

    let content = dialog_box();
    content.append(&scroller);
    content.append(&ok);

    let dialog = gtk::Window::builder()
        .title(FAVORITES_TITLE)
        .modal(true)
        .transient_for(parent)
        .default_width(480)
        .default_height(360)
        .child(&content)
        .build();

    let dialog_for_ok = dialog.downgrade();
    ok.connect_clicked(move |_| {
        if let Some(dialog) = dialog_for_ok.upgrade() {
            dialog.close();
        }
    });

    dialog.present();
}

/// Asks for a URL pre-filled with `default_url`. `on_confirm` gets the edited text.
pub fn prompt_add_favorite<F>(parent: &impl IsA<gtk::Window>, default_url: &str, on_confirm: F)
where
    F: Fn(String) + 'static,
{
    let header = gtk::Label::new(Some(ADD_FAVORITE_HEADER));
    header.set_xalign(0.0);

    let entry = gtk::Entry::new();
    entry.set_text(default_url);
    entry.set_hexpand(true);

    let field = gtk::Box::new(gtk::Orientation::Horizontal, 8);
    field.append(&gtk::Label::new(Some(URL_LABEL)));
    field.append(&entry);

    let cancel = gtk::Button::with_label("Cancel");
    let ok = gtk::Button::with_label("OK");
    ok.add_css_class("suggested-action");

    let buttons = gtk::Box::new(gtk::Orientation::Horizontal, 8);
    buttons.set_halign(gtk::Align::End);
    buttons.append(&cancel);
    buttons.append(&ok);

    let content = dialog_box();
    content.append(&header);
    content.append(&field);
    content.append(&buttons);

    let dialog = gtk::Window::builder()
        .title(ADD_FAVORITE_TITLE)
        .modal(true)
        .transient_for(parent)
        .default_width(420)
        .resizable(false)
        .child(&content)
        .build();

    let dialog_for_submit = dialog.downgrade();
    let entry_for_submit = entry.downgrade();
    let submit = Rc::new(move || {
        let (Some(dialog), Some(entry)) = (dialog_for_submit.upgrade(), entry_for_submit.upgrade())
        else {
            return;
        };
        on_confirm(entry.text().to_string());
        dialog.close();
    });

    let submit_for_ok = Rc::clone(&submit);
    ok.connect_clicked(move |_| submit_for_ok());
    entry.connect_activate(move |_| submit());

    let dialog_for_cancel = dialog.downgrade();
    cancel.connect_clicked(move |_| {
        if let Some(dialog) = dialog_for_cancel.upgrade() {
            dialog.close();
        }
    });

    dialog.present();
    entry.grab_focus();
}

fn dialog_box() -> gtk::Box {
    let content = gtk::Box::new(gtk::Orientation::Vertical, 12);
    content.set_margin_top(12);
    content.set_margin_bottom(12);
    content.set_margin_start(12);
    content.set_margin_end(12);
    content
}
