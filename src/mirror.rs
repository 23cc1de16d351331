//! Mirror Display
//!
//! Page-side control of the picture-in-picture mirror: one surface at a
//! time, and an `active` flag that always follows the surface's real state.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_pip::{open_surface, pip_supported, MirrorSlot, MirrorSurface, PipError, PipWindow, WindowSize};

use crate::notify::Notifier;

const UNSUPPORTED: &str = "This browser does not support mini windows";

#[derive(Clone, Copy)]
pub struct MirrorController {
    slot: StoredValue<MirrorSlot<PipWindow>, LocalStorage>,
    active: RwSignal<bool>,
    notifier: Notifier,
}

impl MirrorController {
    /// Create a controller whose surface is closed when the component unmounts
    pub fn new(notifier: Notifier) -> Self {
        let controller = Self {
            slot: StoredValue::new_local(MirrorSlot::new()),
            active: RwSignal::new(false),
            notifier,
        };
        on_cleanup(move || controller.close());
        controller
    }

    pub fn is_active(&self) -> Signal<bool> {
        self.active.into()
    }

    /// Close the mirror if open, else open it with `view`
    pub fn toggle<F, N>(&self, size: WindowSize, view: F)
    where
        F: FnOnce() -> N + 'static,
        N: IntoView,
        N::State: 'static,
    {
        if self.active.get_untracked() {
            self.close();
        } else {
            self.open(size, view);
        }
    }

    /// Open a mirror showing `view`, replacing any open one
    pub fn open<F, N>(&self, size: WindowSize, view: F)
    where
        F: FnOnce() -> N + 'static,
        N: IntoView,
        N::State: 'static,
    {
        if !pip_supported() {
            self.notifier.error(UNSUPPORTED);
            return;
        }
        let Some(generation) = self.slot.try_update_value(|slot| slot.begin()) else {
            return;
        };
        self.active.set(false);

        let this = *self;
        spawn_local(async move {
            // pagehide may fire while the slot is mid-close; apply it on a later turn
            let on_closed = move || spawn_local(async move { this.surface_closed(generation) });

            match open_surface(size, view, on_closed).await {
                Ok(surface) => {
                    let mut pending = Some(surface);
                    let installed = this
                        .slot
                        .try_update_value(|slot| pending.take().map(|s| slot.install(generation, s)))
                        .flatten()
                        .unwrap_or(false);
                    if let Some(orphan) = pending {
                        orphan.close();
                    }
                    if installed {
                        this.active.try_set(true);
                        log::debug!("[MIRROR] opened generation {}", generation);
                    }
                }
                Err(PipError::Unsupported) => this.notifier.error(UNSUPPORTED),
                Err(err) => log::error!("[MIRROR] {}", err),
            }
        });
    }

    /// Close from the primary page
    pub fn close(&self) {
        self.slot.try_update_value(|slot| slot.close());
        self.active.try_set(false);
    }

    fn surface_closed(&self, generation: u64) {
        if self.slot.try_update_value(|slot| slot.surface_closed(generation)) == Some(true) {
            self.active.try_set(false);
            log::debug!("[MIRROR] generation {} closed by the window", generation);
        }
    }
}
