/// Terminal previewer for tiny planet and spherical panorama projections
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use log::{debug, info};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use tinyplanet_core::{
    Camera, CameraInput, PlanetConfig, PlanetError, ProjectionMode, ProjectionStrategy, ScaleMode,
    Transform,
};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f32 = 0.5;

/// Degrees of pan per arrow key press
const PAN_STEP: f32 = 5.0;

const CONTROLS_HINT: &str = "P=Projection 1/2/3=Full/Crop/Fit WASD=Pan Q=Quit";

pub fn to_io_error(err: PlanetError) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, err)
}

/// Viewport ratio of a terminal area, corrected for cell shape
pub fn terminal_aspect(columns: u16, rows: u16) -> f32 {
    columns.max(1) as f32 / (rows.max(1) as f32 / CELL_ASPECT)
}

/// Main application struct for terminal panorama rendering
pub struct TerminalApp {
    config: PlanetConfig,
    mode: ProjectionMode,
    strategy: Box<dyn ProjectionStrategy>,
    camera: Camera,
    renderer: AsciiRenderer,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(config: PlanetConfig) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Self::with_size(config, width, height)
    }

    pub fn with_size(config: PlanetConfig, width: u16, height: u16) -> io::Result<Self> {
        let mut camera = Camera::new(width as u32, height as u32);
        camera
            .set_aspect(terminal_aspect(width, height))
            .map_err(to_io_error)?;

        let mode = ProjectionMode::TinyPlanet;
        let strategy = mode.create(&config, &camera).map_err(to_io_error)?;

        Ok(Self {
            config,
            mode,
            strategy,
            camera,
            renderer: AsciiRenderer::new(width as usize, height as usize),
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn mode(&self) -> ProjectionMode {
        self.mode
    }

    pub fn scale_mode(&self) -> ScaleMode {
        self.config.mode
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                let event = event::read()?;
                self.handle_event(event)?;
            }

            // Update
            if self.strategy.update_mesh().map_err(to_io_error)? {
                debug!("vertex buffers resubmitted");
            }

            // Render
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    pub fn handle_event(&mut self, event: Event) -> io::Result<()> {
        match event {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press,
                ..
            }) => self.handle_key(code),
            Event::Resize(width, height) => self.resize(width, height),
            _ => Ok(()),
        }
    }

    fn handle_key(&mut self, code: KeyCode) -> io::Result<()> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char('p') => {
                self.switch(self.mode.toggled(), self.config.mode)?;
            }
            KeyCode::Char('1') => self.switch(self.mode, ScaleMode::Full)?,
            KeyCode::Char('2') => self.switch(self.mode, ScaleMode::Crop)?,
            KeyCode::Char('3') => self.switch(self.mode, ScaleMode::Fit)?,
            KeyCode::Char('a') | KeyCode::Left => {
                self.strategy.apply_input(CameraInput::DeltaX(-PAN_STEP));
            }
            KeyCode::Char('d') | KeyCode::Right => {
                self.strategy.apply_input(CameraInput::DeltaX(PAN_STEP));
            }
            KeyCode::Char('w') | KeyCode::Up => {
                self.strategy.apply_input(CameraInput::DeltaY(-PAN_STEP));
            }
            KeyCode::Char('s') | KeyCode::Down => {
                self.strategy.apply_input(CameraInput::DeltaY(PAN_STEP));
            }
            _ => {}
        }
        Ok(())
    }

    fn resize(&mut self, width: u16, height: u16) -> io::Result<()> {
        self.camera
            .set_aspect(terminal_aspect(width, height))
            .map_err(to_io_error)?;
        self.renderer.resize(width as usize, height as usize);
        info!("viewport resized to {width}x{height}");
        Ok(())
    }

    /// The scale mode is fixed per calculator, so a new one means a new strategy
    fn switch(&mut self, mode: ProjectionMode, scale: ScaleMode) -> io::Result<()> {
        if mode == self.mode && scale == self.config.mode {
            return Ok(());
        }
        self.config.mode = scale;
        self.strategy = mode.create(&self.config, &self.camera).map_err(to_io_error)?;
        self.mode = mode;
        info!("switched to {mode:?} ({scale:?})");
        Ok(())
    }

    /// Draw the current strategy into the renderer's buffers
    pub fn render_frame(&mut self) -> io::Result<()> {
        let projection = self
            .strategy
            .projection_matrix(&self.camera)
            .map_err(to_io_error)?;
        let mvp = Transform::mvp_matrix(
            &self.strategy.model_matrix(),
            &self.strategy.view_matrix(&self.camera),
            &projection,
        );

        // Clear renderer
        self.renderer.clear();

        if let Some(mesh) = self.strategy.mesh() {
            self.renderer.render_mesh(mesh, &mvp);
        }
        Ok(())
    }

    pub fn renderer(&self) -> &AsciiRenderer {
        &self.renderer
    }

    fn render(&mut self) -> io::Result<()> {
        self.render_frame()?;

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Tiny Planet | {:?} {:?} | FPS: {:.1} | {}",
                self.mode, self.config.mode, self.fps, CONTROLS_HINT
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[test]
    fn test_terminal_aspect() {
        assert!((terminal_aspect(80, 40) - 1.0).abs() < 1e-6);
        assert!((terminal_aspect(160, 40) - 2.0).abs() < 1e-6);
        assert!(terminal_aspect(0, 0).is_finite());
    }

    #[test]
    fn test_key_switching() {
        let mut app = TerminalApp::with_size(PlanetConfig::default(), 40, 20).unwrap();
        assert_eq!(app.mode(), ProjectionMode::TinyPlanet);
        assert_eq!(app.scale_mode(), ScaleMode::Fit);

        app.handle_event(press('2')).unwrap();
        assert_eq!(app.scale_mode(), ScaleMode::Crop);
        app.handle_event(press('p')).unwrap();
        assert_eq!(app.mode(), ProjectionMode::Perspective);
        app.handle_event(press('p')).unwrap();
        assert_eq!(app.mode(), ProjectionMode::TinyPlanet);
        assert_eq!(app.scale_mode(), ScaleMode::Crop);
    }

    #[test]
    fn test_resize_and_render() {
        let mut app = TerminalApp::with_size(PlanetConfig::default(), 40, 20).unwrap();
        app.handle_event(Event::Resize(60, 20)).unwrap();
        assert_eq!(app.renderer().width(), 60);

        app.handle_event(press('d')).unwrap();
        app.render_frame().unwrap();
        assert_ne!(app.renderer().char_at(30, 10), ' ');
    }
}
