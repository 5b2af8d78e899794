//! Per-event-kind frame coalescing.
//!
//! Each high-frequency input (wheel, pointer motion, resize) owns one slot.
//! Posting into an occupied slot overwrites the pending payload instead of
//! queueing, so any number of events between two frames produce exactly
//! one unit of work on the next frame. Slots are independent: a pending
//! hover never delays a pending wheel redraw.

/// A capacity-one mailbox whose newest payload wins.
#[derive(Debug, Clone)]
pub struct Coalesced<T> {
    pending: Option<T>,
    dropped: u64,
}

impl<T> Default for Coalesced<T> {
    fn default() -> Self {
        Self {
            pending: None,
            dropped: 0,
        }
    }
}

impl<T> Coalesced<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value`, replacing any payload not yet taken.
    ///
    /// Returns `true` when the slot was empty, i.e. a new frame is needed.
    pub fn post(&mut self, value: T) -> bool {
        let was_idle = self.pending.is_none();
        if !was_idle {
            self.dropped += 1;
        }
        self.pending = Some(value);
        was_idle
    }

    /// Drain the slot. The next [`post`](Self::post) schedules again.
    pub fn take(&mut self) -> Option<T> {
        self.pending.take()
    }

    pub fn is_in_flight(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop the pending payload without running it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Number of payloads overwritten since creation.
    pub fn coalesced(&self) -> u64 {
        self.dropped
    }
}

/// A pointer sample in canvas-relative CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
}

/// A requested canvas size: CSS box and device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSize {
    pub css_width: f64,
    pub css_height: f64,
    pub dpr: f64,
}

/// What the next hover frame should show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HoverRequest {
    At(PointerSample),
    Leave,
}

/// The work one frame tick has to do.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameWork {
    pub resize: Option<SurfaceSize>,
    pub redraw: bool,
    pub hover: Option<HoverRequest>,
}

impl FrameWork {
    pub fn is_empty(&self) -> bool {
        self.resize.is_none() && !self.redraw && self.hover.is_none()
    }
}

/// The four independent slots of one viewer.
#[derive(Debug, Clone, Default)]
pub struct FrameScheduler {
    wheel: Coalesced<()>,
    redraw: Coalesced<()>,
    hover: Coalesced<HoverRequest>,
    resize: Coalesced<SurfaceSize>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wheel(&mut self) -> bool {
        self.wheel.post(())
    }

    pub fn redraw(&mut self) -> bool {
        self.redraw.post(())
    }

    pub fn hover(&mut self, request: HoverRequest) -> bool {
        self.hover.post(request)
    }

    pub fn resize(&mut self, size: SurfaceSize) -> bool {
        self.resize.post(size)
    }

    pub fn is_wheeling(&self) -> bool {
        self.wheel.is_in_flight()
    }

    pub fn is_resizing(&self) -> bool {
        self.resize.is_in_flight()
    }

    pub fn is_hovering(&self) -> bool {
        self.hover.is_in_flight()
    }

    pub fn has_work(&self) -> bool {
        self.wheel.is_in_flight()
            || self.redraw.is_in_flight()
            || self.hover.is_in_flight()
            || self.resize.is_in_flight()
    }

    /// Drain every slot for one frame tick.
    pub fn take(&mut self) -> FrameWork {
        let wheeled = self.wheel.take().is_some();
        let redraw = self.redraw.take().is_some();
        let work = FrameWork {
            resize: self.resize.take(),
            redraw: wheeled || redraw,
            hover: self.hover.take(),
        };
        if !work.is_empty() {
            log::trace!(
                "frame: resize={} redraw={} hover={} (coalesced wheel={} hover={} resize={})",
                work.resize.is_some(),
                work.redraw,
                work.hover.is_some(),
                self.wheel.coalesced(),
                self.hover.coalesced(),
                self.resize.coalesced(),
            );
        }
        work
    }

    /// Forget all pending work.
    pub fn cancel_all(&mut self) {
        self.wheel.cancel();
        self.redraw.cancel();
        self.hover.cancel();
        self.resize.cancel();
    }
}
