//! Commands sent from the UI thread to the audio thread via ring buffer.

use super::bank::Partial;

#[derive(Debug)]
pub enum AudioCommand {
    /// Replace the oscillator bank's partials.
    SetPartials(Vec<Partial>),
    /// Set the master gain (already volume-mapped, clamped to 0.0..=1.0).
    SetGain(f32),
    /// Mute output without tearing down the stream.
    Silence,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringbuf::{
        traits::{Consumer, Producer, Split},
        HeapRb,
    };

    #[test]
    fn partials_cross_the_queue_intact() {
        let rb = HeapRb::<AudioCommand>::new(4);
        let (mut prod, mut cons) = rb.split();
        let partials = vec![Partial {
            frequency: 220.0,
            amplitude: 1.0,
            phase_offset: 0.0,
        }];
        prod.try_push(AudioCommand::SetPartials(partials.clone()))
            .unwrap();

        match cons.try_pop() {
            Some(AudioCommand::SetPartials(got)) => assert_eq!(got, partials),
            other => panic!("expected SetPartials, got {other:?}"),
        }
    }

    #[test]
    fn ordering_preserved() {
        let rb = HeapRb::<AudioCommand>::new(4);
        let (mut prod, mut cons) = rb.split();
        prod.try_push(AudioCommand::SetGain(0.5)).unwrap();
        prod.try_push(AudioCommand::Silence).unwrap();

        assert!(matches!(cons.try_pop(), Some(AudioCommand::SetGain(_))));
        assert!(matches!(cons.try_pop(), Some(AudioCommand::Silence)));
        assert!(cons.try_pop().is_none());
    }

    #[test]
    fn full_queue_rejects() {
        let rb = HeapRb::<AudioCommand>::new(1);
        let (mut prod, _cons) = rb.split();
        assert!(prod.try_push(AudioCommand::Silence).is_ok());
        assert!(prod.try_push(AudioCommand::Silence).is_err());
    }
}
