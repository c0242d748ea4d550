use fred::prelude::*;

use crate::error::Result;

/// One store mutation queued in a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOp {
    HSet { key: String, field: String, value: String },
    HDel { key: String, field: String },
    SAdd { key: String, member: String },
    SRem { key: String, member: String },
    Del { key: String },
}

/// Accumulates mutations and applies them as one MULTI/EXEC transaction.
/// A batch either applies in full or leaves the namespace untouched; callers
/// scope one batch per entity type (writes) or per file (deletion).
#[derive(Debug, Default)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hset(&mut self, key: String, field: String, value: String) -> &mut Self {
        self.ops.push(BatchOp::HSet { key, field, value });
        self
    }

    pub fn hdel(&mut self, key: String, field: String) -> &mut Self {
        self.ops.push(BatchOp::HDel { key, field });
        self
    }

    pub fn sadd(&mut self, key: String, member: String) -> &mut Self {
        self.ops.push(BatchOp::SAdd { key, member });
        self
    }

    pub fn srem(&mut self, key: String, member: String) -> &mut Self {
        self.ops.push(BatchOp::SRem { key, member });
        self
    }

    pub fn del(&mut self, key: String) -> &mut Self {
        self.ops.push(BatchOp::Del { key });
        self
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub async fn apply(self, client: &Client) -> Result<()> {
        if self.ops.is_empty() {
            return Ok(());
        }

        let tx = client.multi();
        for op in self.ops {
            match op {
                BatchOp::HSet { key, field, value } => {
                    let _: Value = tx.hset(key, vec![(field, value)]).await?;
                }
                BatchOp::HDel { key, field } => {
                    let _: Value = tx.hdel(key, field).await?;
                }
                BatchOp::SAdd { key, member } => {
                    let _: Value = tx.sadd(key, member).await?;
                }
                BatchOp::SRem { key, member } => {
                    let _: Value = tx.srem(key, member).await?;
                }
                BatchOp::Del { key } => {
                    let _: Value = tx.del(key).await?;
                }
            }
        }
        let _: Value = tx.exec(true).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ops_accumulate_in_order() {
        let mut batch = WriteBatch::new();
        batch
            .hset("h".into(), "f".into(), "v".into())
            .sadd("s".into(), "m".into());
        batch.del("k".into());

        assert_eq!(batch.len(), 3);
        assert_eq!(
            batch.ops()[0],
            BatchOp::HSet {
                key: "h".into(),
                field: "f".into(),
                value: "v".into()
            }
        );
        assert!(matches!(batch.ops()[2], BatchOp::Del { .. }));
    }

    #[test]
    fn test_empty_batch() {
        let batch = WriteBatch::new();
        assert!(batch.is_empty());
        assert_eq!(batch.len(), 0);
    }
}
