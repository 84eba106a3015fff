//! Interactive model viewer over the rasterizer.
//!
//! Reads commands from stdin (`help` for the list), renders frames on
//! demand and writes them to image files. An optional RON config path
//! on the command line seeds the initial scene.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};

use objview::config::SceneConfig;
use objview::loader::load_obj;
use objview::math::{Mat3, Vec3};
use objview::shaders::blinn_phong::{BlinnPhongUniform, Light};
use objview::{Rasterizer, Rgb};

/// Removes the component of `a` along `n`.
fn gram_schmidt(n: Vec3, a: Vec3) -> Vec3 {
    a - n * (n.dot(&a) / n.dot(&n))
}

struct Shell {
    rasterizer: Rasterizer<BlinnPhongUniform>,
    camera_pos: Vec3,
    camera_dir: Vec3,
    camera_up: Vec3,
    near: f64,
    far: f64,
    /// Degrees; converted to radians at the rasterize call.
    fov_y: f64,
    aspect_ratio: f64,
    width: usize,
    height: usize,
    light_pos: Vec3,
    light_color: Rgb,
    model_path: Option<PathBuf>,
    output_path: PathBuf,
}

impl Shell {
    fn from_config(config: SceneConfig) -> Result<Self> {
        let camera_dir = Vec3::from(config.camera.direction);
        let camera_up = gram_schmidt(camera_dir, Vec3::from(config.camera.up));
        let light = config.light.to_light();

        let mut shell = Self {
            rasterizer: Rasterizer::new(BlinnPhongUniform {
                lights: vec![light.clone()],
            }),
            camera_pos: Vec3::from(config.camera.position),
            camera_dir,
            camera_up,
            near: config.frustum.near,
            far: config.frustum.far,
            fov_y: config.frustum.fov_y,
            aspect_ratio: config.frustum.aspect_ratio,
            width: config.width,
            height: config.height,
            light_pos: light.position,
            light_color: light.intensity,
            model_path: None,
            output_path: config.output,
        };
        if let Some(path) = config.model {
            shell.load_model(&path)?;
        }
        Ok(shell)
    }

    fn load_model(&mut self, path: &PathBuf) -> Result<()> {
        let meshes =
            load_obj(path).with_context(|| format!("failed to load {}", path.display()))?;
        self.rasterizer.clear_placements();
        let count = meshes.len();
        for mesh in meshes {
            self.rasterizer.place(mesh, Mat3::identity(), Vec3::zero());
        }
        self.model_path = Some(path.clone());
        println!("loaded {count} meshes from {}", path.display());
        Ok(())
    }

    fn sync_light(&mut self) {
        self.rasterizer.uniform = BlinnPhongUniform {
            lights: vec![Light {
                position: self.light_pos,
                intensity: self.light_color,
            }],
        };
    }

    fn render(&self, path: &PathBuf) -> Result<()> {
        let frame = self.rasterizer.rasterize(
            self.camera_pos,
            self.camera_dir,
            self.camera_up,
            self.near,
            self.far,
            self.fov_y.to_radians(),
            self.aspect_ratio,
            self.width,
            self.height,
        )?;
        frame.save(path)?;
        println!("wrote {}", path.display());
        Ok(())
    }

    fn print_state(&self) {
        let v = |v: Vec3| format!("{:.2} {:.2} {:.2}", v.x(), v.y(), v.z());
        println!("[camera]");
        println!("  position (cpos)    {}", v(self.camera_pos));
        println!("  direction (cdir)   {}", v(self.camera_dir));
        println!("  up (ctop)          {}", v(self.camera_up));
        println!("[light]");
        println!("  position (lpos)    {}", v(self.light_pos));
        println!(
            "  color (lcolor)     {:.2} {:.2} {:.2}",
            self.light_color.r, self.light_color.g, self.light_color.b
        );
        println!("[frustum]");
        println!("  near (znear)       {:.2}", self.near);
        println!("  far (zfar)         {:.2}", self.far);
        println!("  fov_y (fov)        {:.2} deg", self.fov_y);
        println!("  aspect ratio (ar)  {:.4}", self.aspect_ratio);
        println!("[screen]");
        println!("  width              {}", self.width);
        println!("  height             {}", self.height);
        println!("[io]");
        println!(
            "  model (load)       {}",
            self.model_path
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<none>".into())
        );
        println!("  output (w)         {}", self.output_path.display());
    }

    /// Runs one command; `Ok(true)` means exit.
    fn dispatch(&mut self, args: &[&str]) -> Result<bool> {
        match args {
            [] => {}
            ["exit"] => return Ok(true),
            ["help"] => {
                println!(
                    "commands: load [path]; cpos/cdir/ctop x y z; lpos x y z; \
                     lcolor r g b; znear/zfar/fov/ar v; width/height n; \
                     w [file]; p; exit"
                );
            }
            ["load"] => {
                let path = self
                    .model_path
                    .clone()
                    .ok_or_else(|| anyhow!("no model loaded yet; use `load <path>`"))?;
                self.load_model(&path)?;
            }
            ["load", path] => self.load_model(&PathBuf::from(path))?,
            ["cpos", rest @ ..] => self.camera_pos = parse_vec3(rest)?,
            ["cdir", rest @ ..] => {
                self.camera_dir = parse_vec3(rest)?;
                self.camera_up = gram_schmidt(self.camera_dir, self.camera_up);
                println!("camera up corrected to {}", fmt_vec3(self.camera_up));
            }
            ["ctop", rest @ ..] => {
                self.camera_up = parse_vec3(rest)?;
                self.camera_dir = gram_schmidt(self.camera_up, self.camera_dir);
                println!("camera direction corrected to {}", fmt_vec3(self.camera_dir));
            }
            ["lpos", rest @ ..] => {
                self.light_pos = parse_vec3(rest)?;
                self.sync_light();
            }
            ["lcolor", rest @ ..] => {
                let c = parse_vec3(rest)?;
                self.light_color = Rgb::new(c.x(), c.y(), c.z());
                self.sync_light();
            }
            ["znear", v] => self.near = parse_num(v)?,
            ["zfar", v] => self.far = parse_num(v)?,
            ["fov", v] => self.fov_y = parse_num(v)?,
            ["ar", v] => {
                self.aspect_ratio = parse_num(v)?;
                self.height = (self.width as f64 / self.aspect_ratio).round() as usize;
                println!("height corrected to {}", self.height);
            }
            ["width", v] => {
                self.width = v.parse().context("width must be an integer")?;
                self.aspect_ratio = self.width as f64 / self.height as f64;
                println!("aspect ratio corrected to {:.4}", self.aspect_ratio);
            }
            ["height", v] => {
                self.height = v.parse().context("height must be an integer")?;
                self.aspect_ratio = self.width as f64 / self.height as f64;
                println!("aspect ratio corrected to {:.4}", self.aspect_ratio);
            }
            ["w"] => self.render(&self.output_path.clone())?,
            ["w", file] => {
                self.output_path = PathBuf::from(file);
                self.render(&self.output_path.clone())?;
            }
            ["p"] => self.print_state(),
            _ => println!("unsupported command; try `help`"),
        }
        Ok(false)
    }
}

fn fmt_vec3(v: Vec3) -> String {
    format!("{:.3} {:.3} {:.3}", v.x(), v.y(), v.z())
}

fn parse_num(s: &str) -> Result<f64> {
    s.parse().with_context(|| format!("not a number: {s}"))
}

fn parse_vec3(args: &[&str]) -> Result<Vec3> {
    match args {
        [x, y, z] => Ok(Vec3::new(parse_num(x)?, parse_num(y)?, parse_num(z)?)),
        _ => Err(anyhow!("expected three components")),
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            SceneConfig::load(&path).with_context(|| format!("bad config file {path}"))?
        }
        None => SceneConfig::default(),
    };
    let mut shell = Shell::from_config(config)?;

    println!("objview {}", objview::VERSION);
    let stdin = io::stdin();
    'outer: loop {
        print!("objview> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        for command in line.split(';') {
            let args: Vec<&str> = command.split_whitespace().collect();
            match shell.dispatch(&args) {
                Ok(true) => break 'outer,
                Ok(false) => {}
                Err(e) => println!("error: {e:#}"),
            }
        }
    }
    Ok(())
}
