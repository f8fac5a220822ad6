use std::sync::Arc;

use frameline::animations::{Animation, Easing, Scheduler, StaggerOrder, StaggeredGroup, Tween};
use frameline::player::Player;
use parking_lot::RwLock;

#[tokio::main]
async fn main() {
    // Five bars growing from the center outward, within 2 seconds overall.
    let bars = Arc::new(RwLock::new(vec![0.0f32; 5]));
    let children: Vec<Animation> = (0..5)
        .map(|index| {
            let target = bars.clone();
            Animation::from(Tween::new(1.0, move |progress| target.write()[index] = progress))
                .with_easing(Easing::BackOut)
        })
        .collect();
    let group = StaggeredGroup::new(children, 2.0, 0.5)
        .unwrap()
        .set_order(StaggerOrder::FromCenter);
    println!("{}", group);

    let mut scheduler = Scheduler::new(20.0).unwrap();
    scheduler.add(group).unwrap();

    let mut player = Player::new(scheduler).on_frame(move |frame| {
        let line: Vec<String> = bars
            .read()
            .iter()
            .map(|height| "#".repeat((height * 10.0).round().max(0.0) as usize))
            .map(|bar| format!("{:<12}", bar))
            .collect();
        println!("frame {:>3}: {}", frame, line.join("|"));
        Ok(true)
    });
    player.play().await.unwrap();
}
