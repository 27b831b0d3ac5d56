use std::collections::HashMap;
use std::pin::Pin;

use crate::prompt::{Example, ToolEntry};
use crate::tool::{ToolObject, ToolResult};

/// A registry that resolves tool names requested by the model.
pub struct Executor {
    tools: HashMap<String, Box<dyn ToolObject>>,
    // Registration order, so the catalog shown to the model is stable.
    order: Vec<String>,
}

impl Executor {
    pub fn with_tools(tools: Vec<Box<dyn ToolObject>>) -> Self {
        let mut tool_map = HashMap::with_capacity(tools.len());
        let mut order = Vec::with_capacity(tools.len());
        for tool in tools {
            let name = tool.name().to_owned();
            if tool_map.insert(name.clone(), tool).is_some() {
                warn!("tool `{name}` registered twice, keeping the last one");
            } else {
                order.push(name);
            }
        }
        Self {
            tools: tool_map,
            order,
        }
    }

    fn iter(&self) -> impl Iterator<Item = &dyn ToolObject> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name).map(|tool| &**tool))
    }

    #[inline]
    pub fn catalog(&self) -> Vec<ToolEntry<'_>> {
        self.iter()
            .map(|tool| ToolEntry {
                name: tool.name(),
                description: tool.description(),
            })
            .collect()
    }

    #[inline]
    pub fn examples(&self) -> impl Iterator<Item = &Example> {
        self.iter().flat_map(|tool| tool.examples())
    }

    /// Starts invoking the named tool, or returns `None` if no such tool
    /// is registered.
    pub fn invoke(
        &self,
        name: &str,
        input: String,
    ) -> Option<Pin<Box<dyn Future<Output = ToolResult> + Send>>> {
        let Some(tool) = self.tools.get(name) else {
            warn!("tool not found: {name}");
            return None;
        };
        trace!("invoking tool `{name}` with input: {input:?}");
        Some(tool.invoke(input))
    }
}
