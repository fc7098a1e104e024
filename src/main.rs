use std::error::Error;
use std::fs;
use std::io::Write as _;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use log::info;

use relief::config::MaterialLayer;
use relief::{ChunkCoord, ChunkScene, PoiFactory, PoiHandle, TerrainGrid, TerrainParams};
use relief_geom::{Vec2, Vec3};
use relief_heightmap::{color_map_from_height_map, generate_height_map};
use relief_mesh_cpu::{MeshData, generate_terrain_mesh};

#[derive(Parser)]
#[command(name = "relief", about = "Streaming heightmap terrain generator")]
struct Cli {
    /// TOML terrain config; defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the streaming loop with a scripted viewer flying along +x.
    Stream {
        #[arg(long, default_value_t = 240)]
        ticks: u64,
        /// Viewer speed in world units per tick.
        #[arg(long, default_value_t = 12.0)]
        speed: f32,
    },
    /// Generate one chunk's height map and mesh, dump stats and a grayscale
    /// elevation image.
    Preview {
        #[arg(long, default_value_t = 0)]
        lod: usize,
        /// Output PPM path for the elevation image.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

/// Scene sink that only logs what the grid pushes at it.
#[derive(Default)]
struct LogScene {
    meshes_applied: usize,
    colliders_applied: usize,
}

impl ChunkScene for LogScene {
    fn configure_material(&mut self, layers: &[MaterialLayer], min_height: f32, max_height: f32) {
        info!(
            "material configured: {} layers, heights {min_height:.1}..{max_height:.1}",
            layers.len()
        );
    }

    fn apply_mesh(&mut self, coord: ChunkCoord, lod_index: usize, mesh: &MeshData) {
        self.meshes_applied += 1;
        info!(
            "chunk {coord}: mesh applied, lod index {lod_index}, {} verts {} tris",
            mesh.vertex_count(),
            mesh.triangle_count()
        );
    }

    fn apply_collider(&mut self, coord: ChunkCoord, mesh: &MeshData) {
        self.colliders_applied += 1;
        info!("chunk {coord}: collider applied, {} tris", mesh.triangle_count());
    }

    fn set_visible(&mut self, coord: ChunkCoord, visible: bool) {
        info!("chunk {coord}: visible={visible}");
    }
}

#[derive(Default)]
struct LogPoiFactory {
    next: u64,
    alive: usize,
}

impl PoiFactory for LogPoiFactory {
    fn instantiate(&mut self, position: Vec3) -> PoiHandle {
        let handle = PoiHandle(self.next);
        self.next += 1;
        self.alive += 1;
        info!(
            "poi #{} spawned at ({:.1}, {:.1}, {:.1})",
            handle.0, position.x, position.y, position.z
        );
        handle
    }

    fn destroy(&mut self, handle: PoiHandle) {
        self.alive -= 1;
        info!("poi #{} destroyed", handle.0);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let params = match &cli.config {
        Some(path) => relief::load_params_from_path(path)?,
        None => TerrainParams::default(),
    };

    match cli.cmd {
        Command::Stream { ticks, speed } => run_stream(params, ticks, speed),
        Command::Preview { lod, out } => run_preview(params, lod, out),
    }
}

fn run_stream(params: TerrainParams, ticks: u64, speed: f32) -> Result<(), Box<dyn Error>> {
    let mut scene = LogScene::default();
    let mut poi = LogPoiFactory::default();
    let mut grid = TerrainGrid::new(params, &mut scene);

    let mut viewer = Vec2::ZERO;
    for _ in 0..ticks {
        grid.tick(viewer, &mut scene, &mut poi);
        viewer += Vec2::new(speed, 0.0);
        std::thread::sleep(Duration::from_millis(16));
    }
    // Let in-flight jobs land before reporting.
    while grid.pending_jobs() > 0 {
        grid.tick(viewer, &mut scene, &mut poi);
        std::thread::sleep(Duration::from_millis(5));
    }

    info!(
        "done: {} chunks indexed, {} visible, {} meshes applied, {} colliders, {} pois alive",
        grid.chunk_count(),
        grid.visible_coords().len(),
        scene.meshes_applied,
        scene.colliders_applied,
        poi.alive
    );
    Ok(())
}

fn run_preview(params: TerrainParams, lod: usize, out: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let n = params.mesh.sample_count();
    let map = generate_height_map(n, n, &params.height_map, Vec2::ZERO);
    let mesh = generate_terrain_mesh(&map, &params.mesh, lod);
    info!(
        "chunk (0,0) lod {lod}: heights {:.2}..{:.2}, {} verts, {} tris",
        map.min_value,
        map.max_value,
        mesh.vertex_count(),
        mesh.triangle_count()
    );

    if let Some(path) = out {
        let rgba = color_map_from_height_map(&map);
        let mut f = fs::File::create(&path)?;
        write!(f, "P6\n{n} {n}\n255\n")?;
        for px in rgba.chunks_exact(4) {
            f.write_all(&px[..3])?;
        }
        info!("elevation image written to {}", path.display());
    }
    Ok(())
}
