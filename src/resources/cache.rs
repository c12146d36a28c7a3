//! Binary model cache.
//!
//! After the first successful import a model's extracted meshes are dumped
//! to `<base>/<stem>.mcache` so later runs skip the scene importer
//! entirely. The format is a straight binary encoding of the mesh arrays:
//! the vertex records are written as their exact in-memory layout, so a
//! reload reproduces byte-identical vertex and index data. A bad magic or
//! version is reported as [`Error::Cache`], which callers treat as a cache
//! miss.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use crate::{
    data_structures::{
        model::Mesh,
        texture::{TextureRef, TextureRole},
        vertex::ModelVertex,
    },
    error::{Error, Result},
};

const MAGIC: &[u8; 4] = b"TNGC";
const VERSION: u32 = 1;

/// Cache file path for a scene file: same directory, same stem, `.mcache`.
pub fn cache_file(base_path: &Path, file_name: &str) -> PathBuf {
    let stem = Path::new(file_name)
        .file_stem()
        .unwrap_or_else(|| file_name.as_ref());
    base_path.join(stem).with_extension("mcache")
}

/// Write the extracted meshes of a model to the cache file.
pub fn export(path: &Path, meshes: &[Mesh]) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::cache(path, e.to_string()))?;
    let mut writer = BufWriter::new(file);
    write_meshes(&mut writer, meshes).map_err(|e| Error::cache(path, e.to_string()))?;
    writer
        .flush()
        .map_err(|e| Error::cache(path, e.to_string()))?;
    log::info!("wrote model cache {}", path.display());
    Ok(())
}

/// Load meshes back from a cache file.
pub fn import(path: &Path) -> Result<Vec<Mesh>> {
    let file = File::open(path).map_err(|e| Error::cache(path, e.to_string()))?;
    let mut reader = BufReader::new(file);
    let meshes = read_meshes(&mut reader, path)?;
    log::info!(
        "loaded {} meshes from model cache {}",
        meshes.len(),
        path.display()
    );
    Ok(meshes)
}

/// Serialize meshes to any writer. Exposed for round-trip tests.
pub fn write_meshes<W: Write>(writer: &mut W, meshes: &[Mesh]) -> io::Result<()> {
    writer.write_all(MAGIC)?;
    writer.write_all(&VERSION.to_le_bytes())?;
    writer.write_all(&(meshes.len() as u32).to_le_bytes())?;
    for mesh in meshes {
        write_str(writer, &mesh.name)?;
        writer.write_all(&(mesh.vertices.len() as u32).to_le_bytes())?;
        writer.write_all(bytemuck::cast_slice(&mesh.vertices))?;
        writer.write_all(&(mesh.indices.len() as u32).to_le_bytes())?;
        writer.write_all(bytemuck::cast_slice(&mesh.indices))?;
        writer.write_all(&(mesh.textures.len() as u32).to_le_bytes())?;
        for texture in &mesh.textures {
            writer.write_all(&[texture.role.tag()])?;
            write_str(writer, &texture.path.to_string_lossy())?;
        }
    }
    Ok(())
}

/// Deserialize meshes from any reader. Exposed for round-trip tests.
pub fn read_meshes<R: Read>(reader: &mut R, label: &Path) -> Result<Vec<Mesh>> {
    let fail = |reason: String| Error::cache(label, reason);

    let mut magic = [0u8; 4];
    read_exact(reader, &mut magic, label)?;
    if &magic != MAGIC {
        return Err(fail("not a model cache file".into()));
    }
    let version = read_u32(reader, label)?;
    if version != VERSION {
        return Err(fail(format!(
            "cache version {version} does not match {VERSION}"
        )));
    }

    let mesh_count = read_u32(reader, label)?;
    let mut meshes = Vec::with_capacity(mesh_count as usize);
    for _ in 0..mesh_count {
        let name = read_str(reader, label)?;

        let vertex_count = read_u32(reader, label)? as usize;
        let mut vertex_bytes = vec![0u8; vertex_count * std::mem::size_of::<ModelVertex>()];
        read_exact(reader, &mut vertex_bytes, label)?;
        let vertices: Vec<ModelVertex> = bytemuck::pod_collect_to_vec(&vertex_bytes);

        let index_count = read_u32(reader, label)? as usize;
        let mut index_bytes = vec![0u8; index_count * std::mem::size_of::<u32>()];
        read_exact(reader, &mut index_bytes, label)?;
        let indices: Vec<u32> = bytemuck::pod_collect_to_vec(&index_bytes);

        let texture_count = read_u32(reader, label)?;
        let mut textures = Vec::with_capacity(texture_count as usize);
        for _ in 0..texture_count {
            let mut tag = [0u8; 1];
            read_exact(reader, &mut tag, label)?;
            let role = TextureRole::from_tag(tag[0])
                .ok_or_else(|| Error::cache(label, format!("unknown texture role {}", tag[0])))?;
            let path = read_str(reader, label)?;
            textures.push(TextureRef::new(path, role));
        }

        meshes.push(Mesh::new(name, vertices, indices, textures));
    }
    Ok(meshes)
}

fn write_str<W: Write>(writer: &mut W, s: &str) -> io::Result<()> {
    writer.write_all(&(s.len() as u32).to_le_bytes())?;
    writer.write_all(s.as_bytes())
}

fn read_str<R: Read>(reader: &mut R, label: &Path) -> Result<String> {
    let len = read_u32(reader, label)? as usize;
    let mut bytes = vec![0u8; len];
    read_exact(reader, &mut bytes, label)?;
    String::from_utf8(bytes).map_err(|e| Error::cache(label, e.to_string()))
}

fn read_u32<R: Read>(reader: &mut R, label: &Path) -> Result<u32> {
    let mut bytes = [0u8; 4];
    read_exact(reader, &mut bytes, label)?;
    Ok(u32::from_le_bytes(bytes))
}

fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8], label: &Path) -> Result<()> {
    reader
        .read_exact(buf)
        .map_err(|e| Error::cache(label, e.to_string()))
}
