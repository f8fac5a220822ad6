use frameline::animations::{Animation, Batch, Once, Scheduler, Sequencer, Until, Wait};
use frameline::player::Player;

#[tokio::main]
async fn main() {
    let sequencer = Sequencer::new(|| {
        // One batch per second: a message, then a one second wait.
        let countdown = (1..=3).rev().map(|count| {
            Batch::from(vec![
                Animation::from(Once::new(move || println!("{}...", count))),
                Animation::from(Wait::new(1.0)),
            ])
        });

        // Then climb until high enough: the last batch decides itself when it is over.
        let mut altitude = 0;
        let climb = Until::new(move || {
            altitude += 10;
            println!("altitude: {}m", altitude);
            altitude >= 100
        });

        countdown.chain(std::iter::once(Batch::from(Animation::from(climb))))
    });

    let mut scheduler = Scheduler::new(10.0).unwrap();
    scheduler.add(sequencer).unwrap();

    let frames = Player::new(scheduler).play().await.unwrap();
    println!("liftoff sequence played in {} frames", frames);
}
