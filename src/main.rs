use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::{debug, info, trace};
use minifb::{Key, Scale, Window, WindowOptions};

use vip8::{Emulator, FRAME_CYCLES};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The path of the rom to load
    #[arg(short, long, value_name = "FILE")]
    rom_path: PathBuf,

    /// Machine cycles the CPU may spend per 60 Hz frame
    #[arg(short, long, default_value_t = FRAME_CYCLES)]
    cycles_per_frame: u32,

    /// Seed for the random-number instruction, for reproducible runs
    #[arg(short, long)]
    seed: Option<u64>,
}

fn run_rom(bytes: &[u8], budget: u32, seed: Option<u64>) -> anyhow::Result<()> {
    // COSMAC pad 123C / 456D / 789E / A0BF on 1234 / QWER / ASDF / ZXCV
    let keymap: HashMap<Key, u8> = HashMap::from([
        (Key::Key1, 0x1),
        (Key::Key2, 0x2),
        (Key::Key3, 0x3),
        (Key::Key4, 0xC),
        (Key::Q, 0x4),
        (Key::W, 0x5),
        (Key::E, 0x6),
        (Key::R, 0xD),
        (Key::A, 0x7),
        (Key::S, 0x8),
        (Key::D, 0x9),
        (Key::F, 0xE),
        (Key::Z, 0xA),
        (Key::X, 0x0),
        (Key::C, 0xB),
        (Key::V, 0xF),
    ]);

    let mut emulator = Emulator::with_rom(bytes)?.with_budget(budget);
    if let Some(seed) = seed {
        emulator.seed_rng(seed);
    }

    let width = emulator.display().width();
    let height = emulator.display().height();
    let mut buffer: Vec<u32> = vec![0; width * height];

    let mut opts = WindowOptions::default();
    opts.scale = Scale::FitScreen;

    let mut window = Window::new("vip8 - ESC to exit", width, height, opts)?;

    // Limit to max ~60 fps update rate
    window.limit_update_rate(Some(std::time::Duration::from_micros(16600)));
    window.topmost(true);

    let mut sound_playing = false;

    while window.is_open() && !window.is_key_down(Key::Escape) {
        emulator.keyboard_mut().clear();
        for key in window.get_keys() {
            if let Some(keycode) = keymap.get(&key) {
                emulator.keyboard_mut().press_key(*keycode);
            }
        }
        trace!("keypad [{}]", emulator.keyboard());

        let frame = emulator.run_frame()?;

        if frame.sound_active != sound_playing {
            sound_playing = frame.sound_active;
            if sound_playing {
                debug!("sound on");
            } else {
                debug!("sound off");
            }
        }

        if frame.redraw {
            for (i, p) in buffer.iter_mut().zip(emulator.display().pixels()) {
                *i = if *p { 0xFFFFFF } else { 0 };
            }
            window.update_with_buffer(&buffer, width, height)?;
        } else {
            window.update();
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let bytes = std::fs::read(&cli.rom_path)
        .with_context(|| format!("failed to read rom {}", cli.rom_path.display()))?;
    info!("loaded {} byte rom from {}", bytes.len(), cli.rom_path.display());

    run_rom(&bytes, cli.cycles_per_frame, cli.seed)
}
