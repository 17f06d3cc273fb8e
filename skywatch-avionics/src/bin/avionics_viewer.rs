// Copyright 2025 Accenture.
//
// SPDX-License-Identifier: Apache-2.0

//! Ground side: receives telemetry packets and chunked frames, reassembles
//! the frames and reports flight status.

use log::{error, info, warn};
use skywatch::prelude::*;
use skywatch::transfer::{UdpDatagramReceiver, CHUNK_DATAGRAM_SIZE, PACKET_MAX_SIZE};
use skywatch_avionics::config::{FRAME_PORT, RECEIVED_FRAMES_DIR, TELEMETRY_PORT};
use skywatch_avionics::signals;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::process;
use std::thread;
use std::time::Duration;

/// Bounded receive wait, which doubles as the stop-flag poll interval.
const RECV_TIMEOUT: Duration = Duration::from_millis(100);

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    signals::install();

    let params = Params::from_args();
    let config = Config::default();

    info!(
        "Avionics viewer starting: telemetry on {TELEMETRY_PORT}, frames on {FRAME_PORT}, \
         writing to {}",
        params.output_dir.display()
    );

    // startup resource failures are fatal before any worker starts
    if let Err(e) = std::fs::create_dir_all(&params.output_dir) {
        error!("Cannot create {}: {e}", params.output_dir.display());
        process::exit(1);
    }
    let telemetry_rx = bind_or_exit(TELEMETRY_PORT);
    let frame_rx = bind_or_exit(FRAME_PORT);

    let telemetry = {
        let config = config.clone();
        thread::Builder::new()
            .name("sky-telemetry-rx".to_string())
            .spawn(move || telemetry_loop(telemetry_rx, &config))
            .expect("could not spawn thread")
    };

    let output_dir = params.output_dir.clone();
    let frames = thread::Builder::new()
        .name("sky-frame-rx".to_string())
        .spawn(move || frame_loop(frame_rx, &config, &output_dir))
        .expect("could not spawn thread");

    telemetry.join().expect("telemetry receiver panicked");
    frames.join().expect("frame receiver panicked");
    info!("Viewer shutdown complete");
}

fn bind_or_exit(port: u16) -> UdpDatagramReceiver {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    UdpDatagramReceiver::bind(addr).unwrap_or_else(|e| {
        error!("Cannot bind {addr}: {e}");
        process::exit(1);
    })
}

/// Per-frame telemetry packets: track and report the flight state.
fn telemetry_loop(mut rx: UdpDatagramReceiver, config: &Config) {
    info!("Listening for telemetry packets");
    let mut buf = [0u8; PACKET_MAX_SIZE];
    let mut received = 0u32;

    while !signals::stop_requested() {
        let len = match rx.recv(&mut buf, RECV_TIMEOUT) {
            Ok(Some(len)) => len,
            Ok(None) => continue,
            Err(e) => {
                warn!("Telemetry receive failed: {e}");
                continue;
            }
        };
        let packet = match FramePacket::decode(&buf[..len]) {
            Ok(packet) => packet,
            Err(e) => {
                warn!("Dropping malformed telemetry packet: {e}");
                continue;
            }
        };

        received += 1;
        if packet.frame_id % 20 == 0 || packet.frame_id == config.total_frames {
            info!(
                "Frame {}/{}: altitude {:.1} m, speed {:.1} km/h, GPS {:.4},{:.4} ({})",
                packet.frame_id,
                config.total_frames,
                packet.sensor.altitude,
                packet.sensor.speed,
                packet.sensor.latitude,
                packet.sensor.longitude,
                packet.frame_path
            );
        }
        if packet.frame_id == config.first_trigger_frame {
            warn!("Entering obstacle zone at frame {}", packet.frame_id);
        } else if packet.frame_id == config.second_trigger_frame {
            warn!("Obstacle confirmed at frame {}", packet.frame_id);
        }
    }

    info!("Telemetry receiver stopped ({received} packets)");
}

/// Chunk datagrams: reassemble frames and persist completed ones.
fn frame_loop(mut rx: UdpDatagramReceiver, config: &Config, output_dir: &Path) {
    info!("Listening for frame chunks");
    let mut receiver = FrameReceiver::new(config.total_frames, config.assembly_timeout);
    let mut buf = [0u8; CHUNK_DATAGRAM_SIZE];

    while !signals::stop_requested() {
        match rx.recv(&mut buf, RECV_TIMEOUT) {
            Ok(Some(len)) => {
                if let Some(frame) = receiver.handle_datagram(&buf[..len]) {
                    write_frame(output_dir, &frame);
                    if frame.frame_id % 20 == 0 {
                        info!(
                            "Saved frame {} ({} complete, {} in flight)",
                            frame.frame_id,
                            receiver.completed(),
                            receiver.in_flight()
                        );
                    }
                }
            }
            Ok(None) => (),
            Err(e) => warn!("Frame receive failed: {e}"),
        }
        receiver.evict_stale();
    }

    info!(
        "Frame receiver stopped ({} complete, {} evicted)",
        receiver.completed(),
        receiver.evicted()
    );
}

fn write_frame(output_dir: &Path, frame: &CompletedFrame) {
    let path = output_dir.join(format!("frame_{:03}.pgm", frame.frame_id));
    if let Err(e) = std::fs::write(&path, &frame.data) {
        warn!("Cannot write {}: {e}", path.display());
    }
}

/// Parameters of the viewer
struct Params {
    /// Directory completed frames are written into
    output_dir: PathBuf,
}

impl Params {
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let output_dir = args
            .get(1)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(RECEIVED_FRAMES_DIR));
        Self { output_dir }
    }
}
