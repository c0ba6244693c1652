#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> Result<(), eframe::Error> {
    env_logger::init();

    // file dialogs are spawned onto this runtime
    flow_builder::run_app()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
