// Instruction interpreter
//
// Turns a task's instruction text into an ordered sequence of capability
// invocations against the executing agent's own capability set.
//
// Grammar, one instruction per line:
//   blank line                 ignored
//   # comment                  ignored
//   capability_name: params    params is a JSON object, otherwise the raw
//                              text is passed as {"input": "<text>"}

use serde_json::Value;
use tracing::debug;

use super::errors::{AgentError, AgentResult};
use crate::domain::capability::{CapabilitySet, Parameters};

/// Key used when a parameter block is not a JSON object
pub const STRING_PARAMETER_KEY: &str = "input";

/// One resolved line of a task's instructions
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub capability: String,
    pub parameters: Parameters,
}

impl Instruction {
    /// Parses a single line
    ///
    /// Returns `None` for blank lines, comments, and lines without a `:`.
    pub fn parse_line(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let Some((name, raw_parameters)) = line.split_once(':') else {
            debug!(line, "Skipping instruction line without capability separator");
            return None;
        };

        Some(Self {
            capability: name.trim().to_string(),
            parameters: parse_parameters(raw_parameters.trim()),
        })
    }
}

/// Parses a whole instruction block into instructions, in line order
pub fn parse(instructions: &str) -> Vec<Instruction> {
    instructions.lines().filter_map(Instruction::parse_line).collect()
}

fn parse_parameters(raw: &str) -> Parameters {
    if raw.is_empty() {
        return Parameters::new();
    }

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        _ => {
            let mut parameters = Parameters::new();
            parameters.insert(STRING_PARAMETER_KEY.to_string(), Value::String(raw.to_string()));
            parameters
        }
    }
}

/// Executes instructions strictly in order against one capability set
pub struct InstructionInterpreter<'a> {
    capabilities: &'a CapabilitySet,
}

impl<'a> InstructionInterpreter<'a> {
    pub fn new(capabilities: &'a CapabilitySet) -> Self {
        Self { capabilities }
    }

    /// Runs every instruction and aggregates the results
    ///
    /// # Returns
    /// * `Ok(None)` - No capability ran
    /// * `Ok(Some(value))` - Exactly one ran; its result
    /// * `Ok(Some(Value::Array(..)))` - More than one ran; results in order
    /// * `Err(AgentError)` - First missing or failing capability. Lines that
    ///   already ran are not rolled back.
    pub async fn run(&self, instructions: &str) -> AgentResult<Option<Value>> {
        let mut results = Vec::new();

        for instruction in parse(instructions) {
            let capability = self
                .capabilities
                .get(&instruction.capability)
                .ok_or_else(|| AgentError::CapabilityNotFound(instruction.capability.clone()))?;

            debug!(capability = %instruction.capability, "Invoking capability");
            let result = capability
                .invoke(instruction.parameters)
                .await
                .map_err(|source| AgentError::CapabilityFailed {
                    name: instruction.capability.clone(),
                    source,
                })?;
            results.push(result);
        }

        Ok(match results.len() {
            0 => None,
            1 => results.pop(),
            _ => Some(Value::Array(results)),
        })
    }
}
