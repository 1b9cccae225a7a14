use crate::graph::block::AudioBlock;

/// A stage in a processing chain.
///
/// `process` runs on the audio thread: it must not block or allocate. Stages
/// transform the block in place, so a chain is just stages called in order on
/// the same block.
pub trait Processor: Send {
    fn process(&mut self, block: &mut AudioBlock);

    /// Silence internal state and finish parameter ramps in flight.
    ///
    /// Called on the control thread while the chain is stopped.
    fn reset(&mut self) {
        // Default: stateless
    }
}

/// Allow boxed processors to be used as processors (for dynamic dispatch)
impl Processor for Box<dyn Processor> {
    fn process(&mut self, block: &mut AudioBlock) {
        (**self).process(block)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}
