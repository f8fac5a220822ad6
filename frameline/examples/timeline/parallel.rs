use std::sync::Arc;

use frameline::animations::{Animation, Easing, Scheduler, Tween};
use frameline::player::Player;
use parking_lot::RwLock;

#[tokio::main]
async fn main() {
    let opacity = Arc::new(RwLock::new(0.0f32));
    let position = Arc::new(RwLock::new(0.0f32));

    let mut scheduler = Scheduler::new(30.0).unwrap();

    // Fade in and slide in, at the same time.
    let target = opacity.clone();
    scheduler
        .add(Animation::from(Tween::new(1.0, move |progress| *target.write() = progress)).with_easing(Easing::SineOut))
        .unwrap();
    let target = position.clone();
    scheduler
        .add(Tween::new(0.5, move |progress| *target.write() = progress * 100.0))
        .unwrap();

    // Once both are done, hold for half a second, then slide back.
    scheduler.wait_time(0.5).unwrap();
    let target = position.clone();
    scheduler
        .add(Tween::new(0.5, move |progress| *target.write() = (1.0 - progress) * 100.0))
        .unwrap();
    scheduler.wait_frames(0);
    scheduler.hook(|| println!("timeline done")).unwrap();

    let mut player = Player::new(scheduler).on_frame(move |frame| {
        println!(
            "frame {:>3}: opacity={:.2} position={:>6.2}",
            frame,
            *opacity.read(),
            *position.read()
        );
        Ok(true)
    });
    let frames = player.play().await.unwrap();
    println!("{} frames played", frames);
}
