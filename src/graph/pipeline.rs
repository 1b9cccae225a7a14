use crate::{
    graph::{block::AudioBlock, node::Processor},
    io::tap::TapWriter,
};

struct Stage {
    processor: Box<dyn Processor>,
    tap: Option<TapWriter>,
}

/// Ordered list of stages run in place over one block.
///
/// Each stage may carry a tap that receives the block as that stage left it.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    pub fn push<P: Processor + 'static>(&mut self, processor: P) {
        self.stages.push(Stage {
            processor: Box::new(processor),
            tap: None,
        });
    }

    pub fn push_tapped<P: Processor + 'static>(&mut self, processor: P, tap: TapWriter) {
        self.stages.push(Stage {
            processor: Box::new(processor),
            tap: Some(tap),
        });
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl Processor for Pipeline {
    fn process(&mut self, block: &mut AudioBlock) {
        for stage in &mut self.stages {
            stage.processor.process(block);
            if let Some(tap) = stage.tap.as_mut() {
                tap.push_block(block);
            }
        }
    }

    fn reset(&mut self) {
        for stage in &mut self.stages {
            stage.processor.reset();
        }
    }
}
