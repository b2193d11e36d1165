#[cfg(target_arch = "wasm32")]
fn main() {
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("trajectory_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use manifold_trajectory::config::EngineConfig;
    use manifold_trajectory::geom::{GeomMesh, GeomMeshDiagnostics, build_mesh};
    use manifold_trajectory::trajectory::{
        Metrics, Path as TrajectoryPath, SCENARIOS, Scene, SceneRequest, Slider, TIMELINES,
        TemplateSummarizer, TimeHorizon, TrajectoryCache, recompute, resolve_preset,
        summarize_or_message,
    };
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::fmt::Write as _;
    use std::fs::{self, File};
    use std::io::{BufWriter, Write};
    use std::path::{Path, PathBuf};

    const SNAPSHOT_QUANTIZE: f64 = 1e-6;
    const SNAPSHOT_DECIMALS: usize = 6;
    const DEFAULT_JITTER_SEED: u64 = 0;

    const USAGE: &str = r#"trajectory_cli (manifold-trajectory)

USAGE:
  trajectory_cli list
  trajectory_cli run <preset> [options]

PRESETS:
  neutral                      No interventions
  <scenario>                   See `list`
  timeline:<id>                Final phase of a timeline (sets its horizon)
  timeline:<id>#<n>            Phase n (1-based) of a timeline

OPTIONS (run):
  --months <3|6|12>  Forecast horizon (default 12, or the timeline's)
  --snap <path>      Write snapshot to this file instead of stdout
  --obj <path>       Write torus mesh and path polylines as OBJ
  --overwrite        Overwrite existing output files
  --jitter-seed <n>  Seed for the uncertainty jitter (default 0)
  --summary          Print the text report to stderr
  -h, --help         Show this help
"#;

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let Some(command) = args.next() else {
            print_usage();
            return Ok(());
        };

        match command.as_str() {
            "list" => {
                print_presets();
                Ok(())
            }
            "run" => cmd_run(&mut args),
            "-h" | "--help" | "help" => {
                print_usage();
                Ok(())
            }
            other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
        }
    }

    fn print_usage() {
        println!("{USAGE}");
    }

    fn print_presets() {
        println!("scenarios:");
        for scenario in SCENARIOS {
            println!("  {:<24} {} ({})", scenario.id, scenario.name, scenario.expected_improvement);
        }
        println!("timelines:");
        for timeline in TIMELINES {
            println!(
                "  timeline:{:<24} {} ({} phases, {} months)",
                timeline.id,
                timeline.name,
                timeline.phases.len(),
                timeline.horizon_months
            );
        }
    }

    fn cmd_run(args: &mut Args) -> Result<(), String> {
        let preset_name = args.next().ok_or("missing preset name")?;

        let mut months: Option<u32> = None;
        let mut obj_path: Option<PathBuf> = None;
        let mut snap_path: Option<PathBuf> = None;
        let mut overwrite = false;
        let mut jitter_seed = DEFAULT_JITTER_SEED;
        let mut print_summary = false;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--months" => months = Some(parse_number(&args.value("--months")?, "--months")?),
                "--obj" => obj_path = Some(PathBuf::from(args.value("--obj")?)),
                "--snap" => snap_path = Some(PathBuf::from(args.value("--snap")?)),
                "--overwrite" => overwrite = true,
                "--jitter-seed" => {
                    jitter_seed = parse_number(&args.value("--jitter-seed")?, "--jitter-seed")?;
                }
                "--summary" => print_summary = true,
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        let preset = resolve_preset(&preset_name).ok_or_else(|| unknown_preset(&preset_name))?;
        let months = months.or(preset.horizon_months).unwrap_or(12);
        let horizon = TimeHorizon::try_from(months).map_err(|e| e.to_string())?;

        let config = EngineConfig::default();
        let request = SceneRequest {
            horizon,
            interventions: preset.interventions,
        };
        let mut cache = TrajectoryCache::with_capacity(config.cache_capacity);
        let mut rng = StdRng::seed_from_u64(jitter_seed);
        let scene = recompute(&config, &request, &mut cache, &mut rng).map_err(|e| e.to_string())?;

        let text = scene_snapshot(&preset_name, &scene);
        if let Some(path) = snap_path.as_deref() {
            write_text_file(path, &text, overwrite)?;
            eprintln!("wrote {}", path.display());
        } else {
            print!("{text}");
        }

        if let Some(path) = obj_path.as_deref() {
            let (mesh, diag) = build_mesh(
                config.mesh_u,
                config.mesh_v,
                config.major_radius,
                config.minor_radius,
            )
            .map_err(|e| e.to_string())?;
            write_obj_file(path, &mesh, &scene, overwrite)?;
            eprintln!("wrote {}", path.display());
            print_mesh_line(&mesh, &diag);
        }

        if print_summary {
            eprintln!("{}", summarize_or_message(&TemplateSummarizer, &scene.comparison));
        }

        Ok(())
    }

    fn print_mesh_line(mesh: &GeomMesh, diag: &GeomMeshDiagnostics) {
        eprintln!(
            "torus: vertices={} triangles={} | {}",
            mesh.vertex_count(),
            mesh.triangle_count(),
            diag.summary()
        );
    }

    fn parse_number<T: std::str::FromStr>(text: &str, flag: &str) -> Result<T, String> {
        text.trim()
            .parse()
            .map_err(|_| format!("invalid value `{text}` for {flag}"))
    }

    fn unknown_preset(name: &str) -> String {
        let mut msg = String::new();
        let _ = writeln!(msg, "unknown preset `{name}`\n\navailable presets:\n  neutral");
        for scenario in SCENARIOS {
            let _ = writeln!(msg, "  {}", scenario.id);
        }
        for timeline in TIMELINES {
            let _ = writeln!(msg, "  timeline:{}", timeline.id);
        }
        msg
    }

    fn write_text_file(path: &Path, text: &str, overwrite: bool) -> Result<(), String> {
        ensure_writable(path, overwrite)?;
        fs::write(path, normalize_snapshot_text(text)).map_err(|e| format!("write {}: {e}", path.display()))
    }

    fn ensure_writable(path: &Path, overwrite: bool) -> Result<(), String> {
        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }
        Ok(())
    }

    /// Torus as object `torus`, every displayed path as an `l` polyline whose
    /// vertices follow the mesh vertices.
    fn write_obj_file(path: &Path, mesh: &GeomMesh, scene: &Scene, overwrite: bool) -> Result<(), String> {
        mesh.validate().map_err(|e| format!("mesh validation failed: {e}"))?;
        ensure_writable(path, overwrite)?;

        let file = File::create(path).map_err(|e| format!("create {}: {e}", path.display()))?;
        let mut w = BufWriter::new(file);
        let obj_err = |e: std::io::Error| format!("write obj: {e}");

        writeln!(w, "# manifold-trajectory trajectory_cli").map_err(obj_err)?;
        writeln!(w, "o torus").map_err(obj_err)?;
        for p in &mesh.positions {
            writeln!(w, "v {} {} {}", p[0], p[1], p[2]).map_err(obj_err)?;
        }
        for uv in &mesh.uvs {
            writeln!(w, "vt {} {}", uv[0], uv[1]).map_err(obj_err)?;
        }
        for n in &mesh.normals {
            writeln!(w, "vn {} {} {}", n[0], n[1], n[2]).map_err(obj_err)?;
        }
        for tri in mesh.indices.chunks_exact(3) {
            let (a, b, c) = (tri[0] + 1, tri[1] + 1, tri[2] + 1);
            writeln!(w, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}").map_err(obj_err)?;
        }

        let mut next_vertex = mesh.positions.len() + 1;
        for (name, track) in displayed_paths(scene) {
            if track.len() < 2 {
                continue;
            }
            writeln!(w, "o {name}").map_err(obj_err)?;
            for p in track.positions() {
                writeln!(w, "v {} {} {}", p.x, p.y, p.z).map_err(obj_err)?;
            }
            let indices: Vec<String> = (next_vertex..next_vertex + track.len())
                .map(|i| i.to_string())
                .collect();
            writeln!(w, "l {}", indices.join(" ")).map_err(obj_err)?;
            next_vertex += track.len();
        }

        w.flush().map_err(|e| format!("flush {}: {e}", path.display()))
    }

    fn displayed_paths(scene: &Scene) -> [(&'static str, &TrajectoryPath); 6] {
        [
            ("historical", scene.historical.as_ref()),
            ("status_quo", scene.status_quo.as_ref()),
            ("healthy", scene.healthy.as_ref()),
            ("healthy_upper", &scene.healthy_band.upper),
            ("healthy_lower", &scene.healthy_band.lower),
            ("intervention", &scene.intervention),
        ]
    }

    fn scene_snapshot(preset: &str, scene: &Scene) -> String {
        snapshot(preset, |out| {
            let _ = writeln!(out, "horizon {}", scene.horizon.months());

            out.push_str("interventions");
            for slider in Slider::ALL {
                out.push(' ');
                write_f64(out, scene.interventions.get(slider));
            }
            out.push('\n');

            let shaping = &scene.shaping;
            let _ = write!(out, "shaping seed {} score ", shaping.seed);
            write_f64(out, shaping.score);
            out.push_str(" step ");
            write_f64(out, shaping.step_factor);
            out.push_str(" curvature ");
            write_f64(out, shaping.curvature_factor);
            out.push('\n');

            for (name, path) in displayed_paths(scene) {
                write_path_section(out, name, path);
            }

            write_metrics(out, "historical", &scene.metrics.historical);
            write_metrics(out, "status_quo", &scene.metrics.status_quo);
            write_metrics(out, "healthy", &scene.metrics.healthy);
            write_metrics(out, "intervention", &scene.comparison.intervention);

            let record = &scene.comparison;
            out.push_str("delta velocity ");
            write_f64(out, record.velocity_delta);
            out.push_str(" acceleration ");
            write_f64(out, record.acceleration_delta);
            out.push_str(" velocity_pct ");
            write_f64(out, record.velocity_change_pct);
            out.push_str(" acceleration_pct ");
            write_f64(out, record.acceleration_change_pct);
            out.push('\n');
            let _ = writeln!(out, "status {}", record.status_label);
        })
    }

    fn write_path_section(out: &mut String, name: &str, path: &TrajectoryPath) {
        let _ = writeln!(out, "path {name} {}", path.len());
        for p in path.positions() {
            out.push_str("  ");
            write_f64(out, p.x);
            out.push(' ');
            write_f64(out, p.y);
            out.push(' ');
            write_f64(out, p.z);
            out.push('\n');
        }
    }

    /// Uncertainty carries the jitter and is quantized like everything else;
    /// it is only stable for a fixed `--jitter-seed`.
    fn write_metrics(out: &mut String, name: &str, metrics: &Metrics) {
        let _ = write!(out, "metrics {name} ");
        write_f64(out, metrics.velocity);
        out.push(' ');
        write_f64(out, metrics.acceleration);
        out.push(' ');
        write_f64(out, metrics.uncertainty);
        out.push('\n');
    }

    fn snapshot(preset: &str, sections: impl FnOnce(&mut String)) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# manifold-trajectory golden v1");
        let _ = writeln!(out, "preset {preset}");
        let _ = writeln!(out, "quantize {SNAPSHOT_QUANTIZE:.1e}");
        sections(&mut out);
        normalize_snapshot_text(&out)
    }

    fn normalize_snapshot_text(text: &str) -> String {
        let normalized = text.replace("\r\n", "\n");
        if normalized.ends_with('\n') {
            normalized
        } else {
            format!("{normalized}\n")
        }
    }

    fn quantize_f64(value: f64) -> f64 {
        if !value.is_finite() {
            return value;
        }
        let q = (value / SNAPSHOT_QUANTIZE).round() * SNAPSHOT_QUANTIZE;
        if q == 0.0 { 0.0 } else { q }
    }

    fn write_f64(out: &mut String, value: f64) {
        let value = quantize_f64(value);
        let _ = write!(out, "{value:.SNAPSHOT_DECIMALS$}");
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next()
                .ok_or_else(|| format!("missing value for {flag}"))
        }
    }
}
