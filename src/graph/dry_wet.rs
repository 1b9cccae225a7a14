use crate::{
    dsp::mix::blend_dry_wet,
    graph::{block::AudioBlock, node::Processor},
    io::tap::TapWriter,
    param::ParamRamp,
};

/*
Dry/Wet Node
============

Wraps an effect and crossfades its output with the signal that went in:

  block ──┬────────────────────────→ dry ──┐
          │                                ├──→ (1-b)·dry + b·wet ──→ block
          └──→ [effect] ──→ wet ──(tap)────┘

The dry copy lives in a block allocated at construction, so processing never
allocates. The balance is ramped per sample like every other parameter; it
was validated against [0, 1] on the control thread, so the blend itself is
unchecked.

An optional tap sees the wet signal before blending, which is the only place
it exists as a separate signal.
*/

pub struct DryWetNode<P> {
    effect: P,
    balance: ParamRamp,
    dry: AudioBlock,
    wet_tap: Option<TapWriter>,
}

impl<P: Processor> DryWetNode<P> {
    pub fn new(effect: P, balance: ParamRamp, channels: usize) -> Self {
        Self {
            effect,
            balance,
            dry: AudioBlock::new(channels, 0),
            wet_tap: None,
        }
    }

    /// Send the effect's (wet) output to `tap`.
    pub fn with_wet_tap(mut self, tap: TapWriter) -> Self {
        self.wet_tap = Some(tap);
        self
    }

    pub fn effect(&self) -> &P {
        &self.effect
    }

    pub fn effect_mut(&mut self) -> &mut P {
        &mut self.effect
    }
}

impl<P: Processor> Processor for DryWetNode<P> {
    fn process(&mut self, block: &mut AudioBlock) {
        self.dry.copy_from(block);
        self.effect.process(block);

        if let Some(tap) = self.wet_tap.as_mut() {
            tap.push_block(block);
        }

        self.balance.poll();
        let channels = block.channels().min(self.dry.channels());
        for frame in 0..block.frames() {
            let balance = self.balance.advance();
            for ch in 0..channels {
                let dry = self.dry.sample(ch, frame);
                let mixed = blend_dry_wet(dry, block.sample(ch, frame), balance);
                block.set_sample(ch, frame, mixed);
            }
        }
        self.balance.publish();
    }

    fn reset(&mut self) {
        self.effect.reset();
        self.balance.settle();
    }
}
