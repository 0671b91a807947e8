//! Native binary: headless summaries and a winit window. The web build
//! enters through `mirror_stage::web::start` instead.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(err) = native::run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::any::Any;
    use std::env;
    use std::fmt;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::Arc;

    use anyhow::{anyhow, Context, Result};
    use log::{error, info, warn};
    use pollster::block_on;
    use winit::application::ApplicationHandler;
    use winit::dpi::LogicalSize;
    use winit::event::WindowEvent;
    use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
    use winit::window::{Window, WindowId};

    use mirror_stage::{
        print_summary, spawn_load, NativeFetcher, HeadlessTarget, Renderer, SceneConfig,
        SceneHandle, PRESETS,
    };

    const DEFAULT_TICKS: u64 = 120;
    const DEFAULT_SIZE: (u32, u32) = (1280, 720);

    pub fn run() -> Result<()> {
        let options = CliOptions::parse()?;
        let config = options.load_config()?;
        config
            .validate()
            .with_context(|| format!("scene '{}' is invalid", config.name))?;

        println!(
            "Loaded scene '{}' ({} lights, environment: {})",
            config.name,
            config.lights.len(),
            if config.environment.is_some() {
                "cube map"
            } else {
                "none"
            }
        );

        if options.summary_only {
            run_headless(&config, &options)
        } else {
            match run_interactive(&config, &options) {
                Ok(()) => Ok(()),
                Err(err) => {
                    if err.downcast_ref::<WindowInitError>().is_some() {
                        eprintln!(
                            "{err}. Falling back to --summary-only mode (set DISPLAY or install X11 libs to enable rendering)."
                        );
                        run_headless(&config, &options)
                    } else {
                        Err(err)
                    }
                }
            }
        }
    }

    /// Loads the environment synchronously, then runs the loop without a GPU.
    fn run_headless(config: &SceneConfig, options: &CliOptions) -> Result<()> {
        let (width, height) = options.size;
        let mut handle =
            SceneHandle::initialize(config, width, height, HeadlessTarget::new(width, height))?;
        if let Some(faces) = config.environment.as_ref() {
            handle.resolve_environment(block_on(faces.load(&NativeFetcher)));
        }
        for _ in 0..options.ticks {
            let Ok(()) = handle.tick();
        }
        print_summary(&handle);
        Ok(())
    }

    fn run_interactive(config: &SceneConfig, options: &CliOptions) -> Result<()> {
        let default_hook = panic::take_hook();
        panic::set_hook(Box::new(|_| {}));
        let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
        panic::set_hook(default_hook);
        let event_loop = event_loop
            .map_err(|panic| WindowInitError::from_panic("event loop", panic))?
            .map_err(|err| WindowInitError::from_error("event loop", err))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = InteractiveApp {
            config: config.clone(),
            size: options.size,
            window: None,
            handle: None,
            last_error: None,
        };
        event_loop
            .run_app(&mut app)
            .map_err(|err| WindowInitError::from_error("event loop", err))?;

        if let Some(err) = app.last_error {
            return Err(err);
        }
        if let Some(handle) = app.handle.as_ref() {
            print_summary(handle);
        }
        Ok(())
    }

    struct InteractiveApp {
        config: SceneConfig,
        size: (u32, u32),
        window: Option<Arc<Window>>,
        handle: Option<SceneHandle<Renderer>>,
        last_error: Option<anyhow::Error>,
    }

    impl InteractiveApp {
        fn create_scene(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
            let (width, height) = self.size;
            let attributes = Window::default_attributes()
                .with_title(format!("Mirror Stage - {}", self.config.name))
                .with_inner_size(LogicalSize::new(width as f64, height as f64));
            let window = Arc::new(
                event_loop
                    .create_window(attributes)
                    .map_err(|err| WindowInitError::from_error("window", err))?,
            );
            let size = window.inner_size();
            let renderer = block_on(Renderer::new(
                Arc::clone(&window),
                size.width.max(1),
                size.height.max(1),
            ))?;
            let mut handle = SceneHandle::initialize(&self.config, size.width, size.height, renderer)?;
            if let Some(faces) = self.config.environment.clone() {
                handle.attach_environment(spawn_load(faces, NativeFetcher));
            }
            handle.render_loop.start();
            window.request_redraw();
            self.window = Some(window);
            self.handle = Some(handle);
            Ok(())
        }

        fn redraw(&mut self) -> Result<()> {
            let Some(handle) = self.handle.as_mut() else {
                return Ok(());
            };
            if let Err(err) = handle.tick() {
                match err {
                    wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                        handle.target.reconfigure();
                    }
                    wgpu::SurfaceError::OutOfMemory => {
                        return Err(anyhow!("GPU is out of memory"));
                    }
                    wgpu::SurfaceError::Timeout => {
                        info!("Surface timeout; retrying next frame");
                    }
                    wgpu::SurfaceError::Other => {
                        warn!("Surface reported an unknown error; retrying next frame");
                    }
                }
            }
            Ok(())
        }

        fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
            error!("{err:#}");
            self.last_error = Some(err);
            event_loop.exit();
        }
    }

    impl ApplicationHandler for InteractiveApp {
        fn resumed(&mut self, event_loop: &ActiveEventLoop) {
            if self.window.is_some() {
                return;
            }
            if let Err(err) = self.create_scene(event_loop) {
                self.fail(event_loop, err);
            }
        }

        fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
            if self.window.as_ref().map(|window| window.id()) != Some(window_id) {
                return;
            }
            match event {
                WindowEvent::CloseRequested => event_loop.exit(),
                WindowEvent::Resized(size) => {
                    if let Some(handle) = self.handle.as_mut() {
                        handle.resize(size.width, size.height);
                    }
                }
                WindowEvent::RedrawRequested => {
                    if let Err(err) = self.redraw() {
                        self.fail(event_loop, err);
                    }
                }
                _ => {}
            }
        }

        fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
            if let Some(window) = self.window.as_ref() {
                window.request_redraw();
            }
        }
    }

    #[derive(Debug)]
    struct WindowInitError {
        message: String,
    }

    impl WindowInitError {
        fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
            Self {
                message: format!("failed to initialize {stage}: {}", panic_message(panic)),
            }
        }

        fn from_error(stage: &str, err: impl fmt::Display) -> Self {
            Self {
                message: format!("failed to initialize {stage}: {err}"),
            }
        }
    }

    impl fmt::Display for WindowInitError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(&self.message)
        }
    }

    impl std::error::Error for WindowInitError {}

    fn panic_message(panic: Box<dyn Any + Send>) -> String {
        match panic.downcast::<String>() {
            Ok(msg) => *msg,
            Err(panic) => match panic.downcast::<&'static str>() {
                Ok(msg) => (*msg).to_string(),
                Err(_) => "unknown panic".into(),
            },
        }
    }

    struct CliOptions {
        path: Option<String>,
        preset: String,
        summary_only: bool,
        ticks: u64,
        size: (u32, u32),
    }

    const USAGE: &str = "Usage: mirror-stage [<scene.xml>] [--preset <name>] [--summary-only] [--ticks <n>] [--size <width>x<height>]";

    impl CliOptions {
        fn parse() -> Result<Self> {
            Self::parse_from(env::args().skip(1))
        }

        fn parse_from(args: impl IntoIterator<Item = String>) -> Result<Self> {
            let mut options = Self {
                path: None,
                preset: "mirror".to_string(),
                summary_only: false,
                ticks: DEFAULT_TICKS,
                size: DEFAULT_SIZE,
            };
            let mut args = args.into_iter();
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--summary-only" => options.summary_only = true,
                    "--preset" => {
                        options.preset = args
                            .next()
                            .ok_or_else(|| anyhow!("--preset expects one of {}", PRESETS.join(", ")))?;
                    }
                    "--ticks" => {
                        let value = args.next().ok_or_else(|| anyhow!("--ticks expects a count"))?;
                        options.ticks = value
                            .parse()
                            .with_context(|| format!("invalid tick count '{value}'"))?;
                    }
                    "--size" => {
                        let value = args
                            .next()
                            .ok_or_else(|| anyhow!("--size expects <width>x<height>"))?;
                        options.size = parse_size(&value)?;
                    }
                    "--help" | "-h" => return Err(anyhow!(USAGE)),
                    other if other.starts_with("--") => {
                        return Err(anyhow!("Unknown argument: {other}. {USAGE}"));
                    }
                    other => {
                        if options.path.replace(other.to_string()).is_some() {
                            return Err(anyhow!("Only one scene file may be given. {USAGE}"));
                        }
                    }
                }
            }
            Ok(options)
        }

        fn load_config(&self) -> Result<SceneConfig> {
            match &self.path {
                Some(path) => {
                    let xml = std::fs::read_to_string(path)
                        .with_context(|| format!("failed to read scene {path}"))?;
                    SceneConfig::from_xml(&xml)
                        .with_context(|| format!("failed to parse scene XML {path}"))
                }
                None => Ok(SceneConfig::preset(&self.preset)?),
            }
        }
    }

    fn parse_size(value: &str) -> Result<(u32, u32)> {
        let (width, height) = value
            .split_once('x')
            .ok_or_else(|| anyhow!("invalid size '{value}', expected <width>x<height>"))?;
        let width: u32 = width
            .trim()
            .parse()
            .with_context(|| format!("invalid width in '{value}'"))?;
        let height: u32 = height
            .trim()
            .parse()
            .with_context(|| format!("invalid height in '{value}'"))?;
        if width == 0 || height == 0 {
            return Err(anyhow!("size '{value}' has zero area"));
        }
        Ok((width, height))
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn parse(args: &[&str]) -> Result<CliOptions> {
            CliOptions::parse_from(args.iter().map(|arg| arg.to_string()))
        }

        #[test]
        fn defaults_to_the_mirror_preset() {
            let options = parse(&[]).unwrap();
            assert_eq!(options.preset, "mirror");
            assert_eq!(options.ticks, DEFAULT_TICKS);
            assert_eq!(options.size, DEFAULT_SIZE);
            assert!(options.path.is_none());
        }

        #[test]
        fn reads_flags_and_scene_path() {
            let options = parse(&[
                "scene.xml",
                "--summary-only",
                "--ticks",
                "10",
                "--size",
                "800x600",
            ])
            .unwrap();
            assert_eq!(options.path.as_deref(), Some("scene.xml"));
            assert!(options.summary_only);
            assert_eq!(options.ticks, 10);
            assert_eq!(options.size, (800, 600));
        }

        #[test]
        fn rejects_bad_input() {
            assert!(parse(&["--bogus"]).is_err());
            assert!(parse(&["a.xml", "b.xml"]).is_err());
            assert!(parse(&["--ticks", "many"]).is_err());
            assert!(parse_size("0x600").is_err());
            assert!(parse_size("800").is_err());
        }
    }
}
