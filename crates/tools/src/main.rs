use std::env;
use std::fs;
use std::path::PathBuf;

use geom::PointF;
use map::FloorLevelModel;
use routing::pipeline::NullPipeline;
use routing::{NavMeshBuilder, NavMeshSettings};
use scene::{HitDetector, SceneController, SceneGraph, View};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let mut args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }

    let cmd = args[1].clone();
    args.drain(0..2);

    match cmd.as_str() {
        "levels" => cmd_levels(args),
        "scene" => cmd_scene(args),
        "navmesh" => cmd_navmesh(args),
        _ => Err(usage()),
    }
}

fn load_map(path: &str) -> Result<map::MapData, String> {
    let payload = fs::read_to_string(path).map_err(|e| format!("read {path}: {e}"))?;
    formats::load_map_data_from_json_str(&payload).map_err(|e| format!("parse {path}: {e}"))
}

fn cmd_levels(args: Vec<String>) -> Result<(), String> {
    // indoor levels <map.json>
    if args.len() != 1 {
        return Err(usage());
    }
    let data = load_map(&args[0])?;
    let model = FloorLevelModel::from_map_data(&data);
    for level in model.levels() {
        println!("{} ({})", level.name(), level.numeric_level());
    }
    Ok(())
}

fn cmd_scene(args: Vec<String>) -> Result<(), String> {
    // indoor scene <map.json> [--style NAME] [--floor N] [--zoom Z] [--hit X,Y] [--dark]
    if args.is_empty() {
        return Err(usage());
    }
    let data = load_map(&args[0])?;

    let mut style_name = "default".to_string();
    let mut floor = 0i32;
    let mut zoom: Option<f64> = None;
    let mut hit: Option<(f64, f64)> = None;
    let mut dark = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--style" => {
                i += 1;
                style_name = args
                    .get(i)
                    .ok_or("--style requires a name".to_string())?
                    .clone();
            }
            "--floor" => {
                i += 1;
                floor = parse_arg(&args, i, "--floor")?;
            }
            "--zoom" => {
                i += 1;
                zoom = Some(parse_arg(&args, i, "--zoom")?);
            }
            "--hit" => {
                i += 1;
                let raw: String = parse_arg(&args, i, "--hit")?;
                let (x, y) = raw
                    .split_once(',')
                    .ok_or("--hit expects X,Y".to_string())?;
                hit = Some((
                    x.parse().map_err(|e| format!("--hit: {e}"))?,
                    y.parse().map_err(|e| format!("--hit: {e}"))?,
                ));
            }
            "--dark" => dark = true,
            other => return Err(format!("unknown arg: {other}\n\n{}", usage())),
        }
        i += 1;
    }

    let palette_luminance = if dark { 0.1 } else { 0.9 };
    let mut style = style::presets::by_name(&style_name, palette_luminance)
        .ok_or_else(|| format!("unknown style: {style_name}"))?;
    style.compile(data.data_set());

    let mut view = View::new();
    view.set_screen_size(800.0, 600.0);
    view.set_scene_bounding_box(data.bounding_box());
    view.set_floor_level(floor);
    if let Some(zoom) = zoom {
        view.set_zoom_level(zoom, PointF::new(400.0, 300.0));
    }

    let mut controller = SceneController::new();
    let mut sg = SceneGraph::new();
    controller.update_scene(&data, &style, &view, &mut sg);

    println!(
        "scene: {} items in {} layer ranges (zoom {:.1}, floor {})",
        sg.items().len(),
        sg.layer_offsets().len(),
        view.zoom_level(),
        view.floor_level(),
    );
    for offset in sg.layer_offsets() {
        println!(
            "  layer {} z {}: {} items",
            offset.layer,
            offset.z,
            offset.end - offset.begin
        );
    }

    if let Some((x, y)) = hit {
        let detector = HitDetector::new();
        match detector.item_at(PointF::new(x, y), &sg, &view) {
            Some(item) => {
                let elem = item.element.resolve(data.data_set());
                println!("hit: {}", elem.url());
                for tag in elem.tags() {
                    println!("    {} = {}", data.data_set().key_name(tag.key), tag.value);
                }
            }
            None => println!("hit: no element"),
        }
    }

    Ok(())
}

fn cmd_navmesh(args: Vec<String>) -> Result<(), String> {
    // indoor navmesh <map.json> [--obj FILE] [--gset FILE] [--settings FILE]
    if args.is_empty() {
        return Err(usage());
    }
    let data = load_map(&args[0])?;

    let mut obj: Option<PathBuf> = None;
    let mut gset: Option<PathBuf> = None;
    let mut settings = NavMeshSettings::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--obj" => {
                i += 1;
                obj = Some(PathBuf::from(
                    args.get(i).ok_or("--obj requires a path".to_string())?,
                ));
            }
            "--gset" => {
                i += 1;
                gset = Some(PathBuf::from(
                    args.get(i).ok_or("--gset requires a path".to_string())?,
                ));
            }
            "--settings" => {
                i += 1;
                let path = args
                    .get(i)
                    .ok_or("--settings requires a path".to_string())?;
                let payload =
                    fs::read_to_string(path).map_err(|e| format!("read {path}: {e}"))?;
                settings = serde_json_from(&payload)?;
            }
            other => return Err(format!("unknown arg: {other}\n\n{}", usage())),
        }
        i += 1;
    }

    let mut builder = NavMeshBuilder::new();
    builder.set_settings(settings);
    if let (Some(gset), Some(obj)) = (&gset, &obj) {
        builder.write_debug_navmesh(gset, obj);
    }

    let job = builder.start(&data, &[], NullPipeline);
    let mesh = job.wait().map_err(|e| e.to_string())?;
    println!(
        "navmesh input: {} vertices, {} triangles, {} off-mesh connections",
        mesh.data.vertex_count, mesh.data.triangle_count, mesh.data.connection_count
    );
    Ok(())
}

fn serde_json_from(payload: &str) -> Result<NavMeshSettings, String> {
    serde_json::from_str(payload).map_err(|e| format!("parse settings: {e}"))
}

fn parse_arg<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    args.get(i)
        .ok_or(format!("{flag} requires a value"))?
        .parse()
        .map_err(|e| format!("{flag}: {e}"))
}

fn usage() -> String {
    let exe = env::args().next().unwrap_or_else(|| "indoor".to_string());
    format!(
        "Usage:\n  {exe} levels <map.json>\n  {exe} scene <map.json> [--style NAME] [--floor N] [--zoom Z] [--hit X,Y] [--dark]\n  {exe} navmesh <map.json> [--obj FILE] [--gset FILE] [--settings FILE]\n\nStyles: breeze-light, breeze-dark, diagnostic, default\n"
    )
}
