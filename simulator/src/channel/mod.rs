//! Bidirectional communication channels between neighboring nodes.
//!
//! Messages travel in *packets*. Each packet has an identifier unique under its sender and
//! a transmission window `[start, start + duration]` where `duration` is drawn uniformly
//! from `(0, max_transmission_time]` (in simulation time units). A packet is received only
//! by nodes that remain neighbors of the sender for the whole window and that survive the
//! packet loss model.
//!
//! A message moves through a channel as follows:
//!
//! 1. [Output::send] queues the message in a packet on the sender.
//! 2. [Output::transmit] (once per step) narrows the receivers to the current neighbors.
//! 3. [Output::deliver] pops packets whose window has ended and applies the loss model.
//! 4. [Input::capture] places the message in the mailbox of every receiver.
//! 5. [Input::receive] hands the message to the application.

mod input;
pub use input::Input;
mod output;
pub use output::Output;
mod packet;
pub use packet::{Delivery, Packet, Targets};

use crate::{metrics::Metrics, Error, NodeId, PacketLoss, Payload};
use rand::rngs::StdRng;

/// The output and input sides of a single node.
pub struct Channel<M> {
    pub output: Output<M>,
    pub input: Input<M>,
}

impl<M: Payload> Channel<M> {
    /// Create a channel for `node`.
    ///
    /// `loss` decides the fate of every (packet, receiver) pair sent by this node and `rng`
    /// draws transmission durations.
    pub fn new(
        node: NodeId,
        max_transmission_time: f64,
        loss: Box<dyn PacketLoss>,
        rng: StdRng,
        metrics: Metrics,
    ) -> Result<Self, Error> {
        if !max_transmission_time.is_finite() || max_transmission_time <= 0.0 {
            return Err(Error::InvalidTransmissionTime(max_transmission_time));
        }
        Ok(Self {
            output: Output::new(node, max_transmission_time, loss, rng, metrics.clone()),
            input: Input::new(node, metrics),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{mocks::Never, Clock};
    use rand::SeedableRng;

    fn channel(node: NodeId, max_transmission_time: f64) -> Result<Channel<String>, Error> {
        Channel::new(
            node,
            max_transmission_time,
            Box::new(Never),
            StdRng::seed_from_u64(node as u64),
            Metrics::default(),
        )
    }

    #[test]
    fn test_invalid_transmission_time() {
        for invalid in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                channel(0, invalid),
                Err(Error::InvalidTransmissionTime(_))
            ));
        }
    }

    #[test]
    fn test_send_to_receive() {
        let mut clock = Clock::new(4).unwrap();
        clock.tick();
        let mut sender = channel(0, 0.125).unwrap();
        let mut receiver = channel(1, 0.125).unwrap();

        sender.output.send(&clock, "hello".to_string(), &[1]);
        clock.tick();
        sender.output.transmit(&clock, &[1]);
        for delivery in sender.output.drain(&clock) {
            for target in delivery.targets {
                assert_eq!(target, 1);
                receiver
                    .input
                    .capture(delivery.packet, delivery.sender, delivery.payload.clone());
            }
        }
        assert_eq!(receiver.input.receive(), Some((0, "hello".to_string())));
        assert_eq!(receiver.input.receive(), None);
    }
}
