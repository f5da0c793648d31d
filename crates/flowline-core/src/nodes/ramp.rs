//! Linear gain ramp with a thread-safe target.

#[cfg(not(feature = "std"))]
use alloc::sync::Arc;
#[cfg(feature = "std")]
use std::sync::Arc;

use core::sync::atomic::{AtomicU32, Ordering};

use crate::graph::{FlowNode, ProcessContext};

/// Ramp length used by [`RampLinear::new`].
pub const DEFAULT_RAMP_FRAMES: usize = 48;

/// Shared target level of a [`RampLinear`].
///
/// A bit-cast `f32` in an `AtomicU32`: a control thread stores, the audio
/// thread loads. Clones share the same value.
#[derive(Debug, Clone)]
pub struct RampTarget(Arc<AtomicU32>);

impl RampTarget {
    /// Creates a target holding `value`.
    pub fn new(value: f32) -> Self {
        Self(Arc::new(AtomicU32::new(value.to_bits())))
    }

    /// Stores a new target. NaN is ignored and the previous target kept.
    #[inline]
    pub fn set(&self, value: f32) {
        if value.is_nan() {
            return;
        }
        self.0.store(value.to_bits(), Ordering::Release);
    }

    /// Loads the current target.
    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Acquire))
    }
}

impl Default for RampTarget {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Multiplies every channel by a level that moves linearly to the target
/// over [`length_in_frames`](Self::length_in_frames) whenever the target
/// changes.
///
/// A change in mid-ramp starts the new ramp from the level reached so far.
/// The target in effect at the first pull after construction or reset is
/// applied at once, without a ramp.
pub struct RampLinear {
    channels: usize,
    target: RampTarget,
    length_in_frames: usize,
    level_from: f32,
    level_to: f32,
    remaining: usize,
    scaler: f32,
    started: bool,
}

impl RampLinear {
    /// Creates a unity-gain ramp of [`DEFAULT_RAMP_FRAMES`] frames.
    pub fn new(channels: usize) -> Self {
        Self::with_target(channels, RampTarget::default())
    }

    /// Creates a ramp driven by an existing target handle.
    pub fn with_target(channels: usize, target: RampTarget) -> Self {
        let level = target.get();
        Self {
            channels,
            target,
            length_in_frames: DEFAULT_RAMP_FRAMES,
            level_from: level,
            level_to: level,
            remaining: 0,
            scaler: 0.0,
            started: false,
        }
    }

    /// Handle for setting the target from another thread.
    pub fn target_handle(&self) -> RampTarget {
        self.target.clone()
    }

    /// Sets the target level.
    pub fn set_target(&mut self, target: f32) {
        self.target.set(target);
    }

    /// The current target level.
    pub fn target(&self) -> f32 {
        self.target.get()
    }

    /// Sets the ramp length used for the next target change.
    pub fn set_length_in_frames(&mut self, frames: usize) {
        self.length_in_frames = frames;
    }

    /// Ramp length in frames.
    pub fn length_in_frames(&self) -> usize {
        self.length_in_frames
    }

    /// Jumps to `level` with no ramp.
    pub fn force_current(&mut self, level: f32) {
        self.level_from = level;
        self.level_to = level;
        self.remaining = 0;
    }

    /// Whether a ramp is in progress.
    pub fn is_ramping(&self) -> bool {
        self.remaining > 0
    }

    /// Level the next frame would be scaled by.
    #[inline]
    pub fn current_level(&self) -> f32 {
        self.level_to - self.remaining as f32 * self.scaler
    }

    fn follow_target(&mut self) {
        let target = self.target.get();
        if !self.started {
            self.force_current(target);
            self.started = true;
        } else if target != self.level_to {
            self.level_from = self.current_level();
            self.level_to = target;
            if self.length_in_frames == 0 {
                self.force_current(target);
            } else {
                self.remaining = self.length_in_frames;
                self.scaler = (self.level_to - self.level_from) / self.length_in_frames as f32;
            }
        }
    }
}

impl FlowNode for RampLinear {
    fn name(&self) -> &'static str {
        "RampLinear"
    }

    fn input_channels(&self) -> &[usize] {
        core::slice::from_ref(&self.channels)
    }

    fn output_channels(&self) -> &[usize] {
        core::slice::from_ref(&self.channels)
    }

    fn process(&mut self, ctx: &mut ProcessContext<'_>, frames: usize) -> usize {
        self.follow_target();
        let channels = self.channels;
        let (input, output) = ctx.io(0, 0);
        let frames_out = output
            .chunks_exact_mut(channels)
            .zip(input.chunks_exact(channels))
            .take(frames);

        for (out, inp) in frames_out {
            let level = if self.remaining > 0 {
                let level = self.current_level();
                self.remaining -= 1;
                level
            } else {
                self.level_to
            };
            for (o, &i) in out.iter_mut().zip(inp) {
                *o = i * level;
            }
        }
        frames
    }

    fn reset(&mut self) {
        self.started = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{FlowGraph, NodeId};

    fn ramp_graph(length: usize) -> (FlowGraph, NodeId) {
        let mut graph = FlowGraph::with_block_size(16);
        let mut ramp = RampLinear::new(1);
        ramp.set_length_in_frames(length);
        let id = graph.add_node(ramp).unwrap();
        graph.set_value(id.input(0), 1.0).unwrap();
        (graph, id)
    }

    fn pull(graph: &mut FlowGraph, id: NodeId, frames: usize, call: i64) -> Vec<f32> {
        let n = graph.pull_data(id, frames, call);
        graph.output_buffer(id.output(0)).unwrap()[..n].to_vec()
    }

    #[test]
    fn target_before_first_pull_applies_immediately() {
        let (mut graph, id) = ramp_graph(4);
        graph.node_mut::<RampLinear>(id).unwrap().set_target(0.25);
        assert!(pull(&mut graph, id, 4, 0).iter().all(|&s| s == 0.25));
    }

    #[test]
    fn ramps_linearly_to_new_target() {
        let (mut graph, id) = ramp_graph(4);
        pull(&mut graph, id, 4, 0);
        graph.node_mut::<RampLinear>(id).unwrap().set_target(0.0);
        let out = pull(&mut graph, id, 6, 1);
        assert_eq!(out, [1.0, 0.75, 0.5, 0.25, 0.0, 0.0]);
    }

    #[test]
    fn retarget_mid_ramp_continues_from_current_level() {
        let (mut graph, id) = ramp_graph(4);
        pull(&mut graph, id, 1, 0);
        let handle = graph.node::<RampLinear>(id).unwrap().target_handle();
        handle.set(0.0);
        assert_eq!(pull(&mut graph, id, 2, 1), [1.0, 0.75]);
        handle.set(1.0);
        // Level 0.5 was next; the new ramp climbs from there.
        let out = pull(&mut graph, id, 5, 2);
        assert_eq!(out, [0.5, 0.625, 0.75, 0.875, 1.0]);
    }

    #[test]
    fn nan_target_is_ignored() {
        let handle = RampTarget::new(0.5);
        handle.set(f32::NAN);
        assert_eq!(handle.get(), 0.5);
    }

    #[test]
    fn zero_length_jumps() {
        let (mut graph, id) = ramp_graph(0);
        pull(&mut graph, id, 2, 0);
        graph.node_mut::<RampLinear>(id).unwrap().set_target(0.5);
        assert_eq!(pull(&mut graph, id, 2, 1), [0.5, 0.5]);
    }
}
