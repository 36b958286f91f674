#[cfg(target_arch = "wasm32")]
fn main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    leptos::mount::mount_to_body(claims_console::app::App);
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    // The console is a wasm32 application; nothing to run on the host.
}
