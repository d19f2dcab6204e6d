use machine_core::{Configuration, Engine, EngineConfig, RunReport};
use serde::Serialize;
use simulator::description::LoadedMachine;
use simulator::errors::LoadError;
use simulator::diagram::render_dot;
use wasm_bindgen::prelude::*;

macro_rules! console_log {
    ($($t:tt)*) => (web_sys::console::log_1(&JsValue::from_str(&format!($($t)*))))
}

/// JS-facing result of a traced run: the report plus one line per configuration.
#[derive(Debug, Serialize)]
pub struct TracedRun {
    pub report: RunReport,
    pub trace: Vec<String>,
}

/// Runs `engine` to completion or `config.max_steps`, collecting trace lines.
pub fn traced_run(engine: &mut Engine, config: &EngineConfig) -> TracedRun {
    let mut configurations: Vec<Configuration> = Vec::new();
    let report = engine.run_with_config(config, &mut configurations);
    TracedRun {
        report,
        trace: configurations.iter().map(Configuration::trace_line).collect(),
    }
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(Into::into)
}

fn error_value(error: &impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

#[wasm_bindgen]
pub struct WasmMachine {
    engine: Engine,
    presets: Vec<String>,
}

#[wasm_bindgen]
impl WasmMachine {
    /// Parses a JSON machine description.
    ///
    /// # Errors
    ///
    /// Throws the load error message for invalid descriptions.
    #[wasm_bindgen(constructor)]
    pub fn new(description: &str) -> Result<Self, JsValue> {
        Self::from_loaded(LoadedMachine::from_json(description))
    }

    /// Parses a YAML machine description.
    ///
    /// # Errors
    ///
    /// Throws the load error message for invalid descriptions.
    #[wasm_bindgen(js_name = fromYaml)]
    pub fn from_yaml(description: &str) -> Result<Self, JsValue> {
        Self::from_loaded(LoadedMachine::from_yaml(description))
    }

    fn from_loaded(loaded: Result<LoadedMachine, LoadError>) -> Result<Self, JsValue> {
        console_error_panic_hook::set_once();
        let loaded = loaded.map_err(|e| error_value(&e))?;
        console_log!(
            "Loaded machine with {} states and {} transitions",
            loaded.definition.states().len(),
            loaded.definition.transitions().len()
        );
        Ok(Self {
            engine: Engine::new(loaded.definition),
            presets: loaded.simulation_strings,
        })
    }

    /// Validates `input` and resets the engine onto it.
    ///
    /// # Errors
    ///
    /// Throws when `input` uses symbols outside the input alphabet.
    pub fn load(&mut self, input: &str) -> Result<(), JsValue> {
        self.engine.load_str(input).map_err(|e| error_value(&e))
    }

    /// Applies one transition; `false` once the machine has halted.
    pub fn step(&mut self) -> bool {
        self.engine.step()
    }

    /// Runs with the given bound (default 10000) and returns the report
    /// together with the trace lines.
    ///
    /// # Errors
    ///
    /// Throws when the result cannot be converted to a JS value.
    pub fn run(&mut self, max_steps: Option<u32>) -> Result<JsValue, JsValue> {
        let config = max_steps.map_or_else(EngineConfig::default, |bound| EngineConfig {
            max_steps: u64::from(bound),
        });
        let traced = traced_run(&mut self.engine, &config);
        console_log!(
            "Run finished: {} after {} steps",
            traced.report.outcome,
            traced.report.steps
        );
        to_js(&traced)
    }

    /// Current configuration as a JS object.
    ///
    /// # Errors
    ///
    /// Throws when the snapshot cannot be converted to a JS value.
    pub fn configuration(&self) -> Result<JsValue, JsValue> {
        to_js(&self.engine.describe_configuration())
    }

    /// Current configuration as a trace line.
    #[must_use]
    pub fn trace_line(&self) -> String {
        self.engine.describe_configuration().trace_line()
    }

    /// Current tape rendered with the blank glyph.
    #[must_use]
    pub fn tape(&self) -> String {
        self.engine.render_tape()
    }

    /// Preset inputs from the description.
    #[must_use]
    pub fn presets(&self) -> js_sys::Array {
        self.presets
            .iter()
            .map(|preset| JsValue::from_str(preset))
            .collect()
    }

    /// State graph in Graphviz DOT format.
    #[must_use]
    pub fn dot(&self) -> String {
        render_dot(self.engine.definition())
    }
}
