//! Triangle meshes and the STL and OBJ formats they move through.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{axis::face_normal, SplitMode};

/// An indexed triangle mesh.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// Vertex positions.
    pub vertices: Vec<[f32; 3]>,
    /// Triangles, as indices into `vertices`.
    pub triangles: Vec<[usize; 3]>,
    /// Loose edges, as indices into `vertices`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<[usize; 2]>,
}

impl Mesh {
    /// Read an ASCII or binary STL file.
    pub fn read_stl(path: &Path) -> Result<Self> {
        let mut file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let indexed = stl_io::read_stl(&mut file).with_context(|| format!("reading STL {}", path.display()))?;
        Ok(Self {
            vertices: indexed.vertices.iter().map(|v| [v[0], v[1], v[2]]).collect(),
            triangles: indexed.faces.iter().map(|face| face.vertices).collect(),
            edges: vec![],
        })
    }

    /// Corner positions of every triangle.
    pub fn triangle_corners(&self) -> impl Iterator<Item = [[f32; 3]; 3]> + '_ {
        self.triangles
            .iter()
            .map(|t| [self.vertices[t[0]], self.vertices[t[1]], self.vertices[t[2]]])
    }

    /// Largest extent along any axis.
    pub fn max_extent(&self) -> f32 {
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        for v in &self.vertices {
            for i in 0..3 {
                min[i] = min[i].min(v[i]);
                max[i] = max[i].max(v[i]);
            }
        }
        if self.vertices.is_empty() {
            return 0.0;
        }
        (0..3).map(|i| max[i] - min[i]).fold(0.0, f32::max)
    }

    /// Apply `f` to every vertex.
    pub fn map_vertices(&mut self, f: impl Fn([f32; 3]) -> [f32; 3]) {
        for v in self.vertices.iter_mut() {
            *v = f(*v);
        }
    }
}

/// Write triangles as an STL file named `solid`.
pub fn write_stl(path: &Path, solid: &str, triangles: &[[[f32; 3]; 3]], ascii: bool) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);

    if ascii {
        writeln!(out, "solid {}", solid)?;
        for [a, b, c] in triangles {
            let n = face_normal(*a, *b, *c);
            writeln!(out, "facet normal {:e} {:e} {:e}", n[0], n[1], n[2])?;
            writeln!(out, "  outer loop")?;
            for v in [a, b, c] {
                writeln!(out, "    vertex {:e} {:e} {:e}", v[0], v[1], v[2])?;
            }
            writeln!(out, "  endloop")?;
            writeln!(out, "endfacet")?;
        }
        writeln!(out, "endsolid {}", solid)?;
    } else {
        let triangles: Vec<stl_io::Triangle> = triangles
            .iter()
            .map(|[a, b, c]| stl_io::Triangle {
                normal: stl_io::Normal::new(face_normal(*a, *b, *c)),
                vertices: [
                    stl_io::Vertex::new(*a),
                    stl_io::Vertex::new(*b),
                    stl_io::Vertex::new(*c),
                ],
            })
            .collect();
        stl_io::write_stl(&mut out, triangles.iter()).context("writing binary STL")?;
    }

    out.flush()?;
    Ok(())
}

/// How an OBJ file is broken into objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjSplit {
    /// Split at `o` records.
    pub objects: bool,
    /// Split at `g` records.
    pub groups: bool,
    /// Keep `l` records.
    pub edges: bool,
}

impl ObjSplit {
    /// Split rules for the given import flags.
    pub fn new(split_mode: SplitMode, objects: bool, groups: bool, edges: bool) -> Self {
        let split = split_mode == SplitMode::On;
        Self {
            objects: split && objects,
            groups: split && groups,
            edges,
        }
    }
}

/// Parse OBJ text into named meshes. Faces with more than three corners
/// are fanned into triangles; texture and normal indices are ignored.
/// Objects without a name take `default_name`.
pub fn parse_obj(text: &str, default_name: &str, split: ObjSplit) -> Result<Vec<(String, Mesh)>> {
    let mut positions: Vec<[f32; 3]> = vec![];
    let mut objects: Vec<(String, Mesh, Vec<Option<usize>>)> = vec![];
    let mut pending_name: Option<String> = None;

    for (number, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or_default().trim();
        let mut fields = line.split_whitespace();
        let Some(keyword) = fields.next() else {
            continue;
        };
        let context = || format!("OBJ line {}: {}", number + 1, line);

        match keyword {
            "v" => {
                let mut p = [0.0f32; 3];
                for c in p.iter_mut() {
                    *c = fields
                        .next()
                        .with_context(context)?
                        .parse()
                        .with_context(context)?;
                }
                positions.push(p);
            }
            "o" | "g" => {
                let splits = if keyword == "o" { split.objects } else { split.groups };
                let name = fields.collect::<Vec<_>>().join(" ");
                if splits && !name.is_empty() {
                    pending_name = Some(name);
                }
            }
            "f" | "l" => {
                if keyword == "l" && !split.edges {
                    continue;
                }
                let mut corners = vec![];
                for field in fields {
                    let index: i64 = field
                        .split('/')
                        .next()
                        .unwrap_or_default()
                        .parse()
                        .with_context(context)?;
                    let index = if index < 0 {
                        positions.len() as i64 + index
                    } else {
                        index - 1
                    };
                    if index < 0 || index as usize >= positions.len() {
                        anyhow::bail!("{}: vertex index out of range", context());
                    }
                    corners.push(index as usize);
                }

                if let Some(name) = pending_name.take() {
                    objects.push((name, Mesh::default(), vec![]));
                } else if objects.is_empty() {
                    objects.push((default_name.to_owned(), Mesh::default(), vec![]));
                }
                let Some((_, mesh, remap)) = objects.last_mut() else {
                    continue;
                };
                let mut local = |global: usize| -> usize {
                    if remap.len() < positions.len() {
                        remap.resize(positions.len(), None);
                    }
                    *remap[global].get_or_insert_with(|| {
                        mesh.vertices.push(positions[global]);
                        mesh.vertices.len() - 1
                    })
                };

                if keyword == "l" {
                    for pair in corners.windows(2) {
                        let edge = [local(pair[0]), local(pair[1])];
                        mesh.edges.push(edge);
                    }
                } else if corners.len() >= 3 {
                    let first = local(corners[0]);
                    for pair in corners[1..].windows(2) {
                        let triangle = [first, local(pair[0]), local(pair[1])];
                        mesh.triangles.push(triangle);
                    }
                }
            }
            _ => {}
        }
    }

    Ok(objects.into_iter().map(|(name, mesh, _)| (name, mesh)).collect())
}
