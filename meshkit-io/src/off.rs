//! OFF format support
//!
//! Reads `OFF` and `NOFF` (per-vertex normals) files. Polygons with more than
//! three corners are fan-triangulated. Everything after `#` on a line is a
//! comment.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use meshkit_algorithms::{compute_vertex_normals, NormalWeighting};
use meshkit_core::{planar_parameterization, Face, Point3f, Result, TriangleMesh, Vector3f};

use crate::{IoError, MeshReader, MeshWriter};

pub struct OffReader;
pub struct OffWriter;

impl MeshReader for OffReader {
    fn read_mesh<P: AsRef<Path>>(path: P) -> Result<TriangleMesh> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => IoError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => IoError::Io(e),
        })?;
        let mesh = Self::read_from(BufReader::new(file))?;
        log::info!(
            "loaded {}: {} vertices, {} faces",
            path.display(),
            mesh.vertex_count(),
            mesh.face_count()
        );
        Ok(mesh)
    }
}

impl OffReader {
    /// Parse an OFF stream
    pub fn read_from<R: BufRead>(reader: R) -> Result<TriangleMesh> {
        Ok(parse_off(reader)?)
    }
}

/// Non-empty, comment-stripped lines with their 1-based line numbers.
struct DataLines<R> {
    lines: std::io::Lines<R>,
    line: usize,
}

impl<R: BufRead> DataLines<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
        }
    }

    fn next_line(&mut self) -> std::result::Result<Option<String>, IoError> {
        for line in self.lines.by_ref() {
            self.line += 1;
            let line = line?;
            let content = line.split('#').next().unwrap_or("").trim();
            if !content.is_empty() {
                return Ok(Some(content.to_string()));
            }
        }
        Ok(None)
    }

    fn expect_line(&mut self, what: &str) -> std::result::Result<String, IoError> {
        self.next_line()?
            .ok_or_else(|| self.error(format!("unexpected end of file, expected {what}")))
    }

    fn error(&self, message: String) -> IoError {
        IoError::ParseError {
            line: self.line,
            message,
        }
    }

    /// Parse the first `count` whitespace separated fields of `line`
    fn fields<T: FromStr>(
        &self,
        line: &str,
        count: usize,
        what: &str,
    ) -> std::result::Result<Vec<T>, IoError> {
        let values = line
            .split_whitespace()
            .take(count)
            .map(|token| {
                token
                    .parse::<T>()
                    .map_err(|_| self.error(format!("invalid {what} value '{token}'")))
            })
            .collect::<std::result::Result<Vec<T>, IoError>>()?;
        if values.len() < count {
            return Err(self.error(format!(
                "expected {count} {what} values, found {}",
                values.len()
            )));
        }
        Ok(values)
    }
}

fn parse_off<R: BufRead>(reader: R) -> std::result::Result<TriangleMesh, IoError> {
    let mut lines = DataLines::new(reader);

    let header = lines.expect_line("OFF header")?;
    let mut tokens = header.split_whitespace();
    let has_normals = match tokens.next() {
        Some("OFF") => false,
        Some("NOFF") => true,
        other => {
            return Err(IoError::InvalidFormat {
                format: other.unwrap_or_default().to_string(),
            })
        }
    };

    // Counts may share the header line
    let rest = tokens.collect::<Vec<_>>().join(" ");
    let counts_line = if rest.is_empty() {
        lines.expect_line("vertex and face counts")?
    } else {
        rest
    };
    let counts: Vec<usize> = lines.fields(&counts_line, 2, "count")?;
    let (vertex_count, face_count) = (counts[0], counts[1]);

    // Counts are untrusted, so storage grows with the lines actually read
    let per_vertex = if has_normals { 6 } else { 3 };
    let mut vertices = Vec::new();
    let mut normals = Vec::new();
    for _ in 0..vertex_count {
        let line = lines.expect_line("vertex")?;
        let v: Vec<f32> = lines.fields(&line, per_vertex, "vertex")?;
        vertices.push(Point3f::new(v[0], v[1], v[2]));
        if has_normals {
            normals.push(Vector3f::new(v[3], v[4], v[5]));
        }
    }

    let mut faces: Vec<Face> = Vec::new();
    for _ in 0..face_count {
        let line = lines.expect_line("face")?;
        let n = lines.fields::<usize>(&line, 1, "face")?[0];
        if n < 3 {
            return Err(lines.error(format!("polygon with {n} vertices")));
        }
        // Trailing values such as colors are ignored
        let wanted = n
            .checked_add(1)
            .ok_or_else(|| lines.error(format!("polygon with {n} vertices")))?;
        let polygon = lines.fields::<usize>(&line, wanted, "face index")?.split_off(1);
        if let Some(&bad) = polygon.iter().find(|&&i| i >= vertex_count) {
            return Err(lines.error(format!(
                "vertex index {bad} out of range for {vertex_count} vertices"
            )));
        }
        for k in 1..n - 1 {
            faces.push([polygon[0], polygon[k], polygon[k + 1]]);
        }
    }

    if !has_normals {
        normals = compute_vertex_normals(&vertices, &faces, NormalWeighting::Uniform);
    }
    let tex_coords = planar_parameterization(&vertices);

    TriangleMesh::from_parts(vertices, normals, tex_coords, faces)
        .map_err(|e| lines.error(e.to_string()))
}

impl MeshWriter for OffWriter {
    fn write_mesh<P: AsRef<Path>>(mesh: &TriangleMesh, path: P) -> Result<()> {
        let file = File::create(path)?;
        Self::write_to(mesh, BufWriter::new(file))
    }
}

impl OffWriter {
    /// Write `mesh` as OFF, or NOFF when it carries non-zero normals
    pub fn write_to<W: Write>(mesh: &TriangleMesh, mut writer: W) -> Result<()> {
        let with_normals = mesh.normals().iter().any(|n| *n != Vector3f::zeros());

        writeln!(writer, "{}", if with_normals { "NOFF" } else { "OFF" })?;
        writeln!(writer, "{} {} 0", mesh.vertex_count(), mesh.face_count())?;

        for (p, n) in mesh.vertices().iter().zip(mesh.normals()) {
            if with_normals {
                writeln!(writer, "{} {} {} {} {} {}", p.x, p.y, p.z, n.x, n.y, n.z)?;
            } else {
                writeln!(writer, "{} {} {}", p.x, p.y, p.z)?;
            }
        }
        for [a, b, c] in mesh.faces() {
            writeln!(writer, "3 {a} {b} {c}")?;
        }

        writer.flush()?;
        Ok(())
    }
}
