mod assets;
mod dialogs;
mod shell;

use adw::prelude::*;
use gtk::glib;

use storage::{Favorites, FileFavoritesStore};
use ui::ShellConfig;

use crate::assets::Assets;
use crate::shell::Shell;

const APP_ID: &str = "com.flowy.browser";

fn main() -> glib::ExitCode {
    util::init_logging();

    let app = adw::Application::builder().application_id(APP_ID).build();
    app.connect_activate(build_ui);
    app.run()
}

fn build_ui(app: &adw::Application) {
    let style_manager = adw::StyleManager::default();
    style_manager.set_color_scheme(adw::ColorScheme::Default);

    let assets = Assets::new();
    let config = ShellConfig::new(assets.start_page_uri);
    let favorites = Favorites::open(FileFavoritesStore::new(&config.favorites_path));
    let first_tab = config.default_tab_label.clone();

    let shell = Shell::new(app, config, favorites);
    shell.open_tab(&first_tab);
    shell.present();
}
