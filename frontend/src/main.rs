// Use lol_alloc as the global allocator for smaller WASM size
#[cfg(target_arch = "wasm32")]
use lol_alloc::{AssumeSingleThreaded, FreeListAllocator};

#[cfg(target_arch = "wasm32")]
#[global_allocator]
static ALLOCATOR: AssumeSingleThreaded<FreeListAllocator> =
    unsafe { AssumeSingleThreaded::new(FreeListAllocator::new()) };

#[cfg(target_arch = "wasm32")]
pub fn main() {
    console_error_panic_hook::set_once();
    autoserve_frontend::logging::init();
    tracing::info!("AutoServe starting");
    leptos::mount::mount_to_body(autoserve_frontend::App);
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("autoserve-frontend runs in the browser; build it with `trunk build` for wasm32.");
}
