//! Connecting ring records with triangles.
//!
//! Every triangle is written counter-clockwise in the y-up space of the
//! shapes.

use shapevg_core::math::{normalize_or_zero, Point};
use shapevg_mesh::MeshSink;

use crate::budget::ShapeBudget;
use crate::dash::DashPattern;
use crate::pool::Circular;
use crate::ring::{Bands, RingStyle, RingVertex, VertexWriter};

/// Writes the fan triangle `(center, prev, cur)` for a ring running
/// counter-clockwise around `center`.
#[inline]
pub fn fan_triangle<S: MeshSink>(sink: &mut S, center: u32, prev: u32, cur: u32) {
    sink.add_triangle(center, prev, cur);
}

/// Writes the two triangles of the band between an inner row and an outer
/// row of vertices, where the outer row lies to the right of the travel
/// direction from `prev` to `cur`.
#[inline]
pub fn band_quad<S: MeshSink>(
    sink: &mut S,
    inner_prev: u32,
    inner_cur: u32,
    outer_prev: u32,
    outer_cur: u32,
) {
    sink.add_triangle(inner_prev, outer_prev, outer_cur);
    sink.add_triangle(inner_prev, outer_cur, inner_cur);
}

/// Writes a triangle of known positions, flipping it if needed so that it
/// winds counter-clockwise.
pub fn oriented_triangle<S: MeshSink>(
    sink: &mut S,
    a: (u32, Point),
    b: (u32, Point),
    c: (u32, Point),
) {
    if (b.1 - a.1).cross(c.1 - a.1) < 0.0 {
        sink.add_triangle(a.0, c.0, b.0);
    } else {
        sink.add_triangle(a.0, b.0, c.0);
    }
}

/// [`band_quad`] for rows whose side is not known in advance.
pub fn oriented_quad<S: MeshSink>(
    sink: &mut S,
    inner_prev: (u32, Point),
    inner_cur: (u32, Point),
    outer_prev: (u32, Point),
    outer_cur: (u32, Point),
) {
    oriented_triangle(sink, inner_prev, outer_prev, outer_cur);
    oriented_triangle(sink, inner_prev, outer_cur, inner_cur);
}

/// What the interior triangles of a ring fan out from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanAnchor {
    /// The interior is not filled.
    None,
    /// A dedicated center vertex.
    Center(u32),
    /// The first ring record. Only valid for convex closed rings.
    Polygon,
}

/// Turns a list of ring records into band and fan triangles.
#[derive(Debug, Clone, Copy)]
pub struct RingEmitter {
    pub bands: Bands,
    pub dash: Option<DashPattern>,
    pub closed: bool,
    pub fan: FanAnchor,
    /// Length of the transparent skirt put at the ends of a dash.
    pub cap_width: f32,
}

impl RingEmitter {
    pub fn new(style: &RingStyle, closed: bool, fan: FanAnchor) -> Self {
        let bands = style.bands();
        Self {
            bands,
            dash: style.effective_dash(),
            closed,
            fan: if bands.contains(Bands::FILL) {
                fan
            } else {
                FanAnchor::None
            },
            cap_width: style.anti_aliasing,
        }
    }

    pub fn with_fan(mut self, fan: FanAnchor) -> Self {
        if self.bands.contains(Bands::FILL) {
            self.fan = fan;
        }
        self
    }

    fn segment_count(&self, records: usize) -> usize {
        match records {
            0 | 1 => 0,
            n if self.closed => n,
            n => n - 1,
        }
    }

    fn is_drawn(&self, segment: usize) -> bool {
        self.dash.map_or(true, |d| d.is_drawn(segment as i64))
    }

    fn has_caps(&self) -> bool {
        self.dash.is_some() && self.bands.contains(Bands::EDGE | Bands::OUTER_AA)
    }

    /// Whether a drawn `segment` starts and ends a dash.
    ///
    /// The pattern restarts at segment 1 of every ring. On a closed ring whose
    /// segment count isn't a multiple of the period the seam cuts the run in
    /// two, so both sides of the seam get a cap when they are drawn.
    fn dash_ends(&self, dash: DashPattern, segment: usize, segments: usize) -> (bool, bool) {
        let seam = self.closed && segments as i64 % dash.period() != 0;
        let s = segment as i64;
        let seam = seam && dash.is_drawn(s);
        (
            dash.is_dash_start(s) || (seam && segment == 1),
            dash.is_dash_end(s) || (seam && segment == segments),
        )
    }

    /// The exact output of [`emit`](Self::emit) for `records` ring records,
    /// including the center vertex of a [`FanAnchor::Center`].
    pub fn budget(&self, records: usize) -> ShapeBudget {
        let mut vertices = records * self.bands.vertices_per_record();
        let mut triangles = 0;

        let segments = self.segment_count(records);
        match self.fan {
            FanAnchor::None => {}
            FanAnchor::Center(_) => {
                vertices += 1;
                triangles += segments;
            }
            FanAnchor::Polygon if self.closed => triangles += records.saturating_sub(2),
            FanAnchor::Polygon => {}
        }

        for s in 1..=segments {
            let drawn = self.is_drawn(s);
            if self.bands.contains(Bands::EDGE) {
                if drawn {
                    triangles += 4;
                }
                if self.bands.contains(Bands::OUTER_AA) && drawn {
                    triangles += 2;
                }
            } else if self.bands.contains(Bands::OUTER_AA) {
                triangles += 2;
            }

            if drawn && self.has_caps() {
                if let Some(dash) = self.dash {
                    let (start, end) = self.dash_ends(dash, s, segments);
                    let caps = usize::from(start) + usize::from(end);
                    vertices += caps * 2;
                    triangles += caps * 2;
                }
            }
        }

        ShapeBudget::new(records, vertices, triangles)
    }

    /// Writes the triangles of a ring whose mesh vertices have already been
    /// written with [`VertexWriter::write_ring_vertex`].
    pub fn emit<S: MeshSink>(&self, writer: &mut VertexWriter<'_, S>, ring: &[RingVertex]) {
        let n = ring.len();
        let edge = self.bands.contains(Bands::EDGE);
        let outer_aa = self.bands.contains(Bands::OUTER_AA);
        let fill_index = |v: &RingVertex| if edge { v.inner_aa_index } else { v.index };

        if self.fan == FanAnchor::Polygon && self.closed && n >= 3 {
            let first = fill_index(&ring[0]);
            for k in 1..n - 1 {
                writer
                    .sink()
                    .add_triangle(first, fill_index(&ring[k]), fill_index(&ring[k + 1]));
            }
        }

        let segments = self.segment_count(n);
        for s in 0..segments {
            let segment = s + 1;
            let (cur, prev) = ring.circular_pair(segment);

            if let FanAnchor::Center(center) = self.fan {
                fan_triangle(writer.sink(), center, fill_index(prev), fill_index(cur));
            }

            let drawn = self.is_drawn(segment);
            if edge && drawn {
                let sink = writer.sink();
                band_quad(
                    sink,
                    prev.inner_aa_index,
                    cur.inner_aa_index,
                    prev.edge_index,
                    cur.edge_index,
                );
                band_quad(sink, prev.edge_index, cur.edge_index, prev.index, cur.index);
            }

            if outer_aa && (drawn || !edge) {
                band_quad(
                    writer.sink(),
                    prev.index,
                    cur.index,
                    prev.outer_aa_index,
                    cur.outer_aa_index,
                );
            }

            if drawn && self.has_caps() {
                if let Some(dash) = self.dash {
                    let (start, end) = self.dash_ends(dash, segment, segments);
                    if start {
                        self.cap(writer, prev, cur);
                    }
                    if end {
                        self.cap(writer, cur, prev);
                    }
                }
            }
        }
    }

    /// A transparent skirt across the edge band at `at`, pointing away from
    /// `other`.
    fn cap<S: MeshSink>(&self, writer: &mut VertexWriter<'_, S>, at: &RingVertex, other: &RingVertex) {
        let dir = normalize_or_zero(at.position - other.position) * self.cap_width;
        let outer = at.position + dir;
        let inner = at.inner_aa_position + dir;
        let outer_index = writer.push_edge_transparent(outer);
        let inner_index = writer.push_edge_transparent(inner);

        let sink = writer.sink();
        let a = (at.index, at.position);
        let b = (at.inner_aa_index, at.inner_aa_position);
        oriented_triangle(sink, a, b, (inner_index, inner));
        oriented_triangle(sink, a, (inner_index, inner), (outer_index, outer));
    }
}
