// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Airborne side: runs the monitor and streams frames plus telemetry.

use log::{error, info, warn};
use skywatch::prelude::*;
use skywatch::transfer::{DirectoryFrameSource, UdpDatagramSender, PACKET_MAX_SIZE};
use skywatch_avionics::config::{
    frame_addr, telemetry_addr, DEFAULT_TARGET, FRAME_HEIGHT, FRAME_WIDTH,
};
use skywatch_avionics::frames::SyntheticFrameSource;
use skywatch_avionics::signals;
use std::net::IpAddr;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    signals::install();

    let params = Params::from_args();
    let config = Config::default();

    info!(
        "Avionics server starting: {} frames at {} fps, streaming to {}",
        config.total_frames, config.fps, params.target
    );

    let store = Arc::new(TelemetryStore::new(config.total_frames));
    let monitor = Monitor::start(store.clone(), &config);

    let telemetry = spawn_telemetry_streamer(store.clone(), &config, &params);
    let frames = spawn_frame_streamer(store.clone(), &config, &params);

    // translate external lifecycle requests against the owned store
    while store.is_active() && !signals::stop_requested() {
        if signals::take_status_request() {
            let s = store.snapshot();
            info!(
                "Status: frame {}/{}, processed {}, pipeline complete: {}, sensor frame {}, detection: {}",
                s.cursor,
                config.total_frames,
                s.total_processed,
                s.processing_complete,
                s.current_sensor.frame_number,
                s.latest_detection
                    .map(|d| d.label)
                    .unwrap_or("none")
            );
        }
        thread::sleep(Duration::from_millis(100));
    }

    info!("Shutting down");
    store.shutdown();
    monitor.shutdown();
    telemetry.join().expect("telemetry streamer panicked");
    frames.join().expect("frame streamer panicked");
    info!("Shutdown complete");
}

/// One telemetry packet per frame, following the cursor at frame cadence.
fn spawn_telemetry_streamer(
    store: Arc<TelemetryStore>,
    config: &Config,
    params: &Params,
) -> thread::JoinHandle<()> {
    let interval = config.frame_interval();
    let total = config.total_frames;
    let addr = telemetry_addr(params.target);
    let source = params.source();

    thread::Builder::new()
        .name("sky-telemetry".to_string())
        .spawn(move || {
            let mut transport = match UdpDatagramSender::connect(addr) {
                Ok(t) => t,
                Err(e) => {
                    error!("Telemetry streamer disabled: {e}");
                    return;
                }
            };
            info!("Telemetry streamer sending to {addr}");

            let mut buf = [0u8; PACKET_MAX_SIZE];
            let mut last_sent = 0u32;
            while store.is_active() && last_sent < total {
                let cursor = store.cursor();
                while last_sent < cursor {
                    last_sent += 1;
                    let Some(sensor) = store.sample_for(last_sent) else {
                        continue;
                    };
                    let packet = FramePacket {
                        frame_id: last_sent,
                        frame_path: source.path(last_sent),
                        width: FRAME_WIDTH,
                        height: FRAME_HEIGHT,
                        sensor,
                    };
                    match packet.encode(&mut buf) {
                        Ok(len) => {
                            if let Err(e) = transport.send(&buf[..len]) {
                                warn!("Telemetry packet {last_sent} not sent: {e}");
                            }
                        }
                        Err(e) => warn!("Telemetry packet {last_sent} not encoded: {e}"),
                    }
                    if last_sent % 20 == 0 {
                        info!("Transmitted {last_sent}/{total} telemetry packets");
                    }
                }
                thread::sleep(interval);
            }
            info!("Telemetry streamer done ({last_sent} packets)");
        })
        .expect("could not spawn thread")
}

/// Frame images chunked over the unreliable transport, following the cursor.
fn spawn_frame_streamer(
    store: Arc<TelemetryStore>,
    config: &Config,
    params: &Params,
) -> thread::JoinHandle<()> {
    let interval = config.frame_interval();
    let pacing = config.chunk_pacing;
    let total = config.total_frames;
    let addr = frame_addr(params.target);
    let mut source = params.source();

    thread::Builder::new()
        .name("sky-frames".to_string())
        .spawn(move || {
            let transport = match UdpDatagramSender::connect(addr) {
                Ok(t) => t,
                Err(e) => {
                    error!("Frame streamer disabled: {e}");
                    return;
                }
            };
            let mut sender = FrameSender::new(transport, pacing);
            info!("Frame streamer sending to {addr}");

            let mut last_sent = 0u32;
            while store.is_active() && last_sent < total {
                let cursor = store.cursor();
                while last_sent < cursor && store.is_active() {
                    last_sent += 1;
                    match source.frame(last_sent) {
                        Some(data) => {
                            if let Err(e) = sender.send_frame(last_sent, &data) {
                                warn!("Frame {last_sent} not sent: {e}");
                            }
                        }
                        None => warn!("Frame {last_sent} unavailable, skipping"),
                    }
                }
                thread::sleep(interval);
            }
            info!("Frame streamer done ({last_sent} frames)");
        })
        .expect("could not spawn thread")
}

/// Parameters of the server
struct Params {
    /// Host receiving both streams
    target: IpAddr,
    /// Directory of pre-extracted frames; synthetic frames when absent
    frames_dir: Option<PathBuf>,
}

impl Params {
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();

        let target = match args.get(1) {
            Some(raw) => raw.parse::<IpAddr>().unwrap_or_else(|_| {
                error!("Invalid target address '{raw}'");
                process::exit(1);
            }),
            None => DEFAULT_TARGET,
        };
        let frames_dir = args.get(2).map(PathBuf::from);

        Self { target, frames_dir }
    }

    fn source(&self) -> Box<dyn FrameSource + Send> {
        match &self.frames_dir {
            Some(dir) => Box::new(DirectoryFrameSource::new(dir.clone())),
            None => Box::new(SyntheticFrameSource::new()),
        }
    }
}
