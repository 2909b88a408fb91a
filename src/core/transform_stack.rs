//! Per-node transform+clip frames composing the accumulated coordinate-space
//! mapping from a node to the root.
//!
//! Frames are ordered node-to-root. Each frame's clip is expressed in the
//! frame's post-transform (target) space: a point is mapped through the
//! frame's transform, then tested against its clip, then handed to the next
//! frame toward the root.

use crate::core::clip::HwClip;
use crate::core::matrix::{Matrix2D, Matrix4x4};
use crate::core::transform_to_root::TransformToRoot;

#[derive(Debug, Clone, PartialEq)]
pub struct TransformAndClipFrame {
    pub transform: Matrix2D,
    pub projection: Option<Matrix4x4>,
    pub clip: HwClip,
}

impl Default for TransformAndClipFrame {
    fn default() -> Self {
        Self::identity()
    }
}

impl TransformAndClipFrame {
    #[must_use]
    pub fn identity() -> Self {
        Self {
            transform: Matrix2D::identity(),
            projection: None,
            clip: HwClip::infinite(),
        }
    }

    #[must_use]
    pub fn from_transform(transform: Matrix2D) -> Self {
        Self {
            transform,
            projection: None,
            clip: HwClip::infinite(),
        }
    }

    #[must_use]
    pub fn from_clip(clip: HwClip) -> Self {
        Self {
            transform: Matrix2D::identity(),
            projection: None,
            clip,
        }
    }

    #[must_use]
    pub fn with_projection(mut self, projection: Matrix4x4) -> Self {
        self.projection = Some(projection);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransformAndClipStack {
    frames: Vec<TransformAndClipFrame>,
}

impl TransformAndClipStack {
    #[must_use]
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn frames(&self) -> &[TransformAndClipFrame] {
        &self.frames
    }

    /// Appends a frame on the root side.
    pub fn push_frame(&mut self, frame: TransformAndClipFrame) {
        self.frames.push(frame);
    }

    /// Composes a node-local transform before everything already stacked.
    pub fn prepend_transform(&mut self, transform: Matrix2D) {
        match self.frames.first_mut() {
            Some(first) => {
                first.transform = transform.multiply(&first.transform);
            }
            None => self.frames.push(TransformAndClipFrame::from_transform(transform)),
        }
    }

    /// Applies a clip in node space, before any stacked transform runs.
    pub fn prepend_clip(&mut self, clip: &HwClip) {
        self.frames
            .insert(0, TransformAndClipFrame::from_clip(clip.clone()));
    }

    /// Merges a child stack below this one.
    ///
    /// At the seam, the child's clip is transformed into the parent's space
    /// and only then intersected with the parent's clip. Intersecting first
    /// and transforming afterwards would clip in the wrong space; the
    /// transform-then-intersect ordering is load-bearing.
    pub fn push_transforms_and_clips(&mut self, child: &Self) {
        if self.frames.is_empty() {
            self.frames = child.frames.clone();
            return;
        }
        if child.frames.is_empty() {
            return;
        }

        let mut merged = child.frames.clone();
        let parent_bottom = &self.frames[0];
        let seam_mergeable = merged
            .last()
            .is_some_and(|child_top| child_top.projection.is_none())
            && parent_bottom.projection.is_none();

        if seam_mergeable {
            let child_top = merged.pop().unwrap_or_else(TransformAndClipFrame::identity);

            let mut seam_clip = child_top.clip;
            seam_clip.transform(&parent_bottom.transform);
            seam_clip.intersect(&parent_bottom.clip);

            merged.push(TransformAndClipFrame {
                transform: child_top.transform.multiply(&parent_bottom.transform),
                projection: None,
                clip: seam_clip,
            });
            merged.extend(self.frames.iter().skip(1).cloned());
        } else {
            merged.extend(self.frames.iter().cloned());
        }

        self.frames = merged;
    }

    /// The accumulated clip expressed in root space.
    ///
    /// Returns `None` when a non-affine projection frame makes a 2D clip
    /// region meaningless; callers fall back to bounds-based culling.
    #[must_use]
    pub fn accumulated_clip(&self) -> Option<HwClip> {
        let mut current = HwClip::infinite();
        for frame in &self.frames {
            current.transform(&frame.transform);
            if let Some(projection) = frame.projection {
                let affine = projection.to_matrix2d()?;
                current.transform(&affine);
            }
            current.intersect(&frame.clip);
        }
        Some(current)
    }

    /// Flattens the stack into a single affine matrix when possible.
    #[must_use]
    pub fn flatten_to_2d(&self) -> Option<Matrix2D> {
        self.transform_to_root().to_matrix2d()
    }

    #[must_use]
    pub fn transform_to_root(&self) -> TransformToRoot {
        let mut accumulator = TransformToRoot::identity();
        for frame in &self.frames {
            accumulator.append_frame(frame);
        }
        accumulator
    }
}
