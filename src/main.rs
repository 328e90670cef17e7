//! Beamsim demo entry point
//!
//! Builds a small level, fires the paddle laser into it and logs what the
//! beam does while the paddle slides underneath. Pass a settings JSON path
//! as the first argument to override the defaults.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Beamsim (native) starting...");

    if let Err(e) = run_demo(std::env::args().nth(1)) {
        log::error!("Demo failed: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is the product; there is no browser demo
}

#[cfg(not(target_arch = "wasm32"))]
fn run_demo(settings_path: Option<String>) -> beamsim::Result<()> {
    use beamsim::BeamSettings;
    use beamsim::consts::{PADDLE_LASER_LIFETIME, SIM_DT};
    use beamsim::sim::{
        Arena, ArenaPaddle, BeamEvent, BeamKind, BeamManager, PaddleLaserEmitter, PieceKind,
    };
    use glam::Vec2;

    let settings = match settings_path {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .map_err(|e| beamsim::BeamError::Settings(format!("{path}: {e}")))?;
            BeamSettings::from_json(&json)?
        }
        None => BeamSettings::default(),
    };

    let mut arena = Arena::new(40.0, 30.0);
    arena.add_piece(PieceKind::Mirror, Vec2::new(4.0, 20.0), Vec2::new(16.0, 24.0));
    arena.add_piece(
        PieceKind::Prism { rays: 3, spread: 0.8 },
        Vec2::new(24.0, 18.0),
        Vec2::new(34.0, 18.0),
    );
    arena.add_portal_pair(
        (Vec2::new(0.5, 4.0), Vec2::new(0.5, 12.0)),
        (Vec2::new(39.5, 4.0), Vec2::new(39.5, 12.0)),
    );
    arena.add_projectile(Vec2::new(20.0, 27.0), 1.0);

    let mut paddle = ArenaPaddle::new(Vec2::new(10.0, 1.0), 1.5, 0.25);
    let mut emitter = PaddleLaserEmitter::new(settings.rng_seed);
    let mut manager = BeamManager::new(settings);

    let pose = paddle.pose(false);
    let dps = PaddleLaserEmitter::base_damage(&pose);
    let seeds = emitter.seeds(&pose, dps)?;
    let laser = manager.spawn(
        BeamKind::PaddleLaser,
        dps,
        PADDLE_LASER_LIFETIME,
        &seeds,
        &arena,
        &mut paddle,
    )?;

    let ticks = (PADDLE_LASER_LIFETIME / SIM_DT).ceil() as u32 + 1;
    let mut damage_dealt = 0.0;
    for frame in 0..ticks {
        // Slide right and widen, go sticky for the middle third
        let progress = frame as f32 / ticks as f32;
        paddle.center.x = 10.0 + 20.0 * progress;
        paddle.half_width = 1.5 + progress;
        let sticky = (ticks / 3..2 * ticks / 3).contains(&frame);
        let pose = paddle.pose(sticky);
        manager.rebuild_paddle_laser(laser, &mut emitter, &pose, &arena, &mut paddle)?;

        damage_dealt += manager
            .damage_contacts(SIM_DT)
            .iter()
            .map(|c| c.damage)
            .sum::<f64>();
        manager.tick(SIM_DT);

        for event in manager.drain_events() {
            match event {
                BeamEvent::Spawned { beam, segments } | BeamEvent::Changed { beam, segments } => {
                    log::debug!("frame {frame}: beam {:?} now {} segments", beam, segments.len());
                }
                BeamEvent::Removed { beam } => {
                    log::info!("frame {frame}: beam {:?} faded out", beam);
                }
            }
        }
        if manager.is_empty() {
            break;
        }
    }

    log::info!(
        "Laser dealt {:.1} damage; paddle absorbed {} hits",
        damage_dealt,
        paddle.hits.len()
    );
    Ok(())
}
