pub mod content;
pub mod inbox;
pub mod task;

/// Common pagination parameters for list commands
#[derive(Debug, Default, Clone, Copy)]
pub struct PageParams {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl PageParams {
    /// Query pairs for the parameters that are set
    pub(crate) fn query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
pub(crate) mod test_server;


#[cfg(test)]
#[path = "task_test.rs"]
mod task_test;

#[cfg(test)]
#[path = "inbox_test.rs"]
mod inbox_test;
