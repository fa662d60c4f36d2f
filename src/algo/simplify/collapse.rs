//! Edge-collapse passes over a flat, index-based copy of the mesh.

use nalgebra::{Point3, Vector3};
use tracing::debug;

use super::quadric::Quadric;
use super::SimplifyOptions;
use crate::algo::Progress;
use crate::geom;

/// Candidate collapses closer to collinear than this are refused.
const COLLINEAR_LIMIT: f64 = 0.9999;

/// Minimum cosine between a triangle's normal before and after a collapse.
const MIN_NORMAL_COSINE: f64 = 0.2;

#[derive(Debug, Clone)]
struct WorkVertex {
    position: Point3<f64>,
    quadric: Quadric,
    border: bool,
    /// First entry of this vertex's triangles in `refs`.
    tstart: usize,
    tcount: usize,
}

#[derive(Debug, Clone)]
struct WorkTriangle {
    v: [usize; 3],
    /// Collapse error of edge `v[j] → v[(j + 1) % 3]`, then the minimum of the three.
    err: [f64; 4],
    normal: Vector3<f64>,
    deleted: bool,
    dirty: bool,
}

/// A triangle incident to a vertex, and the slot the vertex occupies in it.
#[derive(Debug, Clone, Copy, Default)]
struct Ref {
    tid: usize,
    tvertex: usize,
}

/// Mutable simplification state, built fresh for every run.
#[derive(Debug)]
pub(super) struct WorkingSet {
    vertices: Vec<WorkVertex>,
    triangles: Vec<WorkTriangle>,
    refs: Vec<Ref>,
}

impl WorkingSet {
    pub(super) fn new(vertices: Vec<Point3<f64>>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            vertices: vertices
                .into_iter()
                .map(|position| WorkVertex {
                    position,
                    quadric: Quadric::zero(),
                    border: false,
                    tstart: 0,
                    tcount: 0,
                })
                .collect(),
            triangles: faces
                .into_iter()
                .map(|v| WorkTriangle {
                    v,
                    err: [0.0; 4],
                    normal: Vector3::zeros(),
                    deleted: false,
                    dirty: false,
                })
                .collect(),
            refs: Vec::new(),
        }
    }

    /// Collapse edges until at most `target` triangles remain or the pass
    /// limit is reached. Returns the number of passes run.
    pub(super) fn run(
        &mut self,
        target: usize,
        options: &SimplifyOptions,
        progress: &Progress,
    ) -> usize {
        let total = self.triangles.len();
        let mut deleted = 0usize;
        let mut deleted0 = Vec::new();
        let mut deleted1 = Vec::new();
        let mut iteration = 0;

        while iteration < options.max_iterations {
            progress.report(deleted, total - target, "Collapsing edges");
            if total - deleted <= target {
                break;
            }

            if iteration % 5 == 0 {
                self.update_mesh(iteration);
            }
            for t in &mut self.triangles {
                t.dirty = false;
            }

            let threshold = 1e-9 * ((iteration + 3) as f64).powf(options.aggressiveness);

            for i in (0..self.triangles.len()).rev() {
                let t = &self.triangles[i];
                if t.err[3] > threshold || t.deleted || t.dirty {
                    continue;
                }

                for j in 0..3 {
                    let t = &self.triangles[i];
                    if t.err[j] >= threshold {
                        continue;
                    }
                    let i0 = t.v[j];
                    let i1 = t.v[(j + 1) % 3];
                    if self.vertices[i0].border || self.vertices[i1].border {
                        continue;
                    }

                    let (_, p) = self.edge_error(i0, i1);

                    deleted0.clear();
                    deleted0.resize(self.vertices[i0].tcount, false);
                    deleted1.clear();
                    deleted1.resize(self.vertices[i1].tcount, false);

                    if self.flipped(&p, i1, i0, &mut deleted0)
                        || self.flipped(&p, i0, i1, &mut deleted1)
                    {
                        continue;
                    }

                    let q1 = self.vertices[i1].quadric;
                    let v0 = &mut self.vertices[i0];
                    v0.position = p;
                    v0.quadric += q1;

                    let tstart = self.refs.len();
                    deleted += self.update_triangles(i0, i0, &deleted0);
                    deleted += self.update_triangles(i0, i1, &deleted1);
                    let v0 = &mut self.vertices[i0];
                    v0.tstart = tstart;
                    v0.tcount = self.refs.len() - tstart;
                    break;
                }

                if total - deleted <= target {
                    break;
                }
            }

            iteration += 1;
        }

        debug!(iterations = iteration, deleted, "Collapse passes done");
        progress.report(deleted, total - target, "Collapsing edges");
        iteration
    }

    /// Whether moving vertex `v` to `p` would flip or squash one of its triangles.
    ///
    /// Triangles that also contain `other` collapse with the edge; they are
    /// flagged in `deleted` instead of being checked.
    fn flipped(&self, p: &Point3<f64>, other: usize, v: usize, deleted: &mut [bool]) -> bool {
        let vertex = &self.vertices[v];
        for k in 0..vertex.tcount {
            let r = self.refs[vertex.tstart + k];
            let t = &self.triangles[r.tid];
            if t.deleted {
                continue;
            }

            let id1 = t.v[(r.tvertex + 1) % 3];
            let id2 = t.v[(r.tvertex + 2) % 3];
            if id1 == other || id2 == other {
                deleted[k] = true;
                continue;
            }

            let d1 = geom::normalize_or_zero(&(self.vertices[id1].position - p));
            let d2 = geom::normalize_or_zero(&(self.vertices[id2].position - p));
            if d1.dot(&d2).abs() > COLLINEAR_LIMIT {
                return true;
            }
            let n = geom::normalize_or_zero(&d1.cross(&d2));
            deleted[k] = false;
            if n.dot(&t.normal) < MIN_NORMAL_COSINE {
                return true;
            }
        }
        false
    }

    /// Rewrite the triangles of `v` to reference `survivor`, dropping the ones
    /// flagged in `deleted`. Surviving references are appended to `refs`.
    /// Returns the number of triangles removed.
    fn update_triangles(&mut self, survivor: usize, v: usize, deleted: &[bool]) -> usize {
        let WorkVertex { tstart, tcount, .. } = self.vertices[v];
        let mut removed = 0;

        for k in 0..tcount {
            let r = self.refs[tstart + k];
            if self.triangles[r.tid].deleted {
                continue;
            }
            if deleted[k] {
                self.triangles[r.tid].deleted = true;
                removed += 1;
                continue;
            }

            self.triangles[r.tid].v[r.tvertex] = survivor;
            let [a, b, c] = self.triangles[r.tid].v;
            let err = [
                self.edge_error(a, b).0,
                self.edge_error(b, c).0,
                self.edge_error(c, a).0,
            ];
            let t = &mut self.triangles[r.tid];
            t.dirty = true;
            t.err = [err[0], err[1], err[2], err[0].min(err[1]).min(err[2])];
            self.refs.push(r);
        }

        removed
    }

    /// Drop deleted triangles and rebuild the vertex to triangle references.
    ///
    /// On the first pass this also computes the plane quadrics, the initial
    /// edge errors and the border flags. Border flags are not recomputed:
    /// no collapse touches a triangle that holds a boundary edge.
    fn update_mesh(&mut self, iteration: usize) {
        if iteration > 0 {
            self.triangles.retain(|t| !t.deleted);
        }

        if iteration == 0 {
            for v in &mut self.vertices {
                v.quadric = Quadric::zero();
            }
            for t in &mut self.triangles {
                let [p0, p1, p2] = t.v.map(|i| self.vertices[i].position);
                let n = geom::normalize_or_zero(&geom::triangle_cross(&p0, &p1, &p2));
                t.normal = n;
                let plane = Quadric::from_plane(n.x, n.y, n.z, -n.dot(&p0.coords));
                for &i in &t.v {
                    self.vertices[i].quadric += plane;
                }
            }
            for i in 0..self.triangles.len() {
                let [a, b, c] = self.triangles[i].v;
                let err = [
                    self.edge_error(a, b).0,
                    self.edge_error(b, c).0,
                    self.edge_error(c, a).0,
                ];
                self.triangles[i].err = [err[0], err[1], err[2], err[0].min(err[1]).min(err[2])];
            }
        }

        self.rebuild_refs();

        if iteration == 0 {
            self.mark_borders();
        }
    }

    fn rebuild_refs(&mut self) {
        for v in &mut self.vertices {
            v.tstart = 0;
            v.tcount = 0;
        }
        for t in &self.triangles {
            for &i in &t.v {
                self.vertices[i].tcount += 1;
            }
        }
        let mut tstart = 0;
        for v in &mut self.vertices {
            v.tstart = tstart;
            tstart += v.tcount;
            v.tcount = 0;
        }

        self.refs.clear();
        self.refs.resize(self.triangles.len() * 3, Ref::default());
        for (tid, t) in self.triangles.iter().enumerate() {
            for (tvertex, &i) in t.v.iter().enumerate() {
                let v = &mut self.vertices[i];
                self.refs[v.tstart + v.tcount] = Ref { tid, tvertex };
                v.tcount += 1;
            }
        }
    }

    /// A neighbor that shares exactly one triangle with a vertex lies on an
    /// open boundary.
    fn mark_borders(&mut self) {
        let mut counts: Vec<(usize, usize)> = Vec::new();
        for v in 0..self.vertices.len() {
            counts.clear();
            let WorkVertex { tstart, tcount, .. } = self.vertices[v];
            for r in &self.refs[tstart..tstart + tcount] {
                for &id in &self.triangles[r.tid].v {
                    match counts.iter_mut().find(|(other, _)| *other == id) {
                        Some((_, n)) => *n += 1,
                        None => counts.push((id, 1)),
                    }
                }
            }
            for &(id, n) in &counts {
                if n == 1 {
                    self.vertices[id].border = true;
                }
            }
        }
    }

    /// Error and position of collapsing the edge `a`-`b`.
    ///
    /// Away from borders the position minimizes the merged quadric. If that
    /// has no unique minimum, the best of the two endpoints and their midpoint
    /// is used, preferring the midpoint on ties.
    fn edge_error(&self, a: usize, b: usize) -> (f64, Point3<f64>) {
        let (va, vb) = (&self.vertices[a], &self.vertices[b]);
        let q = va.quadric + vb.quadric;
        let border = va.border && vb.border;

        if !border {
            if let Some(p) = q.minimizer() {
                return (q.evaluate(&p), p);
            }
        }

        let mid = Point3::from((va.position.coords + vb.position.coords) / 2.0);
        let candidates = [va.position, vb.position, mid];
        let mut best = (q.evaluate(&candidates[0]), candidates[0]);
        for p in &candidates[1..] {
            let error = q.evaluate(p);
            if error <= best.0 {
                best = (error, *p);
            }
        }
        best
    }

    /// Live triangles and the vertices they use, renumbered in order.
    pub(super) fn into_face_vertex(self) -> (Vec<Point3<f64>>, Vec<[usize; 3]>) {
        let mut used = vec![false; self.vertices.len()];
        for t in self.triangles.iter().filter(|t| !t.deleted) {
            for &i in &t.v {
                used[i] = true;
            }
        }

        let mut remap = vec![0; self.vertices.len()];
        let mut vertices = Vec::new();
        for (i, v) in self.vertices.iter().enumerate() {
            if used[i] {
                remap[i] = vertices.len();
                vertices.push(v.position);
            }
        }

        let faces = self
            .triangles
            .iter()
            .filter(|t| !t.deleted)
            .map(|t| t.v.map(|i| remap[i]))
            .collect();
        (vertices, faces)
    }
}
