// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! OS signal handling.
//!
//! Handlers only store into lock-free atomics; the main loop translates the
//! flags into actions against the owned store. SIGINT/SIGTERM request a
//! cooperative shutdown, SIGUSR1 requests a read-only status dump.

use std::sync::atomic::{AtomicBool, Ordering};

static STOP_REQUESTED: AtomicBool = AtomicBool::new(false);
static STATUS_REQUESTED: AtomicBool = AtomicBool::new(false);

extern "C" fn on_signal(signum: libc::c_int) {
    match signum {
        libc::SIGINT | libc::SIGTERM => STOP_REQUESTED.store(true, Ordering::Relaxed),
        libc::SIGUSR1 => STATUS_REQUESTED.store(true, Ordering::Relaxed),
        _ => (),
    }
}

/// Install the handlers. Call once at startup, before any worker thread.
pub fn install() {
    let handler = on_signal as extern "C" fn(libc::c_int) as libc::sighandler_t;
    // Safety: the handler is async-signal-safe, it only stores to atomics
    unsafe {
        libc::signal(libc::SIGINT, handler);
        libc::signal(libc::SIGTERM, handler);
        libc::signal(libc::SIGUSR1, handler);
    }
}

/// Whether a stop has been requested since startup.
pub fn stop_requested() -> bool {
    STOP_REQUESTED.load(Ordering::Relaxed)
}

/// Consume a pending status-dump request.
pub fn take_status_request() -> bool {
    STATUS_REQUESTED.swap(false, Ordering::Relaxed)
}
