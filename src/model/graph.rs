//! ONNX graph inspection and output exposure.
//!
//! Standard text-classification exports only emit `logits`, but the
//! per-layer attention probabilities still exist inside the graph as the
//! outputs of the self-attention `Softmax` nodes. Listing one of them as a
//! graph output makes the runtime return it alongside the logits.
//!
//! Only the protobuf fields needed for that are declared below; everything
//! else (initializers, attributes, metadata) is skipped when decoding and
//! left untouched in the original bytes.

use prost::Message;

use crate::error::{MoodlensError, Result};

/// `TensorProto.DataType.FLOAT`.
const ELEM_TYPE_FLOAT: i32 = 1;

#[derive(Clone, PartialEq, Message)]
struct ModelProto {
    #[prost(message, optional, tag = "7")]
    graph: Option<GraphProto>,
}

#[derive(Clone, PartialEq, Message)]
struct GraphProto {
    #[prost(message, repeated, tag = "1")]
    node: Vec<NodeProto>,
    #[prost(message, repeated, tag = "12")]
    output: Vec<ValueInfoProto>,
}

#[derive(Clone, PartialEq, Message)]
struct NodeProto {
    #[prost(string, repeated, tag = "1")]
    input: Vec<String>,
    #[prost(string, repeated, tag = "2")]
    output: Vec<String>,
    #[prost(string, tag = "3")]
    name: String,
    #[prost(string, tag = "4")]
    op_type: String,
}

#[derive(Clone, PartialEq, Message)]
struct ValueInfoProto {
    #[prost(string, tag = "1")]
    name: String,
    #[prost(message, optional, tag = "2")]
    r#type: Option<TypeProto>,
}

#[derive(Clone, PartialEq, Message)]
struct TypeProto {
    #[prost(message, optional, tag = "1")]
    tensor_type: Option<TensorTypeProto>,
}

#[derive(Clone, PartialEq, Message)]
struct TensorTypeProto {
    #[prost(int32, tag = "1")]
    elem_type: i32,
}

/// What a model graph exposes and what it could expose.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphInfo {
    /// Declared graph output names, in order.
    pub outputs: Vec<String>,
    /// Output tensor of the last self-attention softmax, if one was found.
    pub attention_probs: Option<String>,
    node_outputs: Vec<String>,
}

impl GraphInfo {
    /// Whether some node in the graph produces a tensor with this name.
    pub fn has_tensor(&self, name: &str) -> bool {
        self.node_outputs.iter().any(|n| n == name)
    }
}

/// Decode the parts of a serialized `ModelProto` needed to locate attention.
pub fn inspect(model: &[u8]) -> Result<GraphInfo> {
    let model = ModelProto::decode(model)
        .map_err(|e| MoodlensError::Configuration(format!("Failed to parse ONNX model: {e}")))?;
    let graph = model
        .graph
        .ok_or_else(|| MoodlensError::Configuration("ONNX model has no graph".to_string()))?;

    let softmaxes: Vec<&NodeProto> = graph
        .node
        .iter()
        .filter(|n| n.op_type == "Softmax" && !n.output.is_empty())
        .collect();

    // Nodes are topologically ordered, so the last match belongs to the last layer.
    let attention = softmaxes
        .iter()
        .rev()
        .find(|n| mentions_attention(n))
        .or_else(|| softmaxes.last())
        .map(|n| n.output[0].clone());

    Ok(GraphInfo {
        outputs: graph.output.into_iter().map(|o| o.name).collect(),
        attention_probs: attention,
        node_outputs: graph.node.into_iter().flat_map(|n| n.output).collect(),
    })
}

fn mentions_attention(node: &NodeProto) -> bool {
    let name = node.name.to_ascii_lowercase();
    name.contains("attention") || node.output[0].to_ascii_lowercase().contains("attention")
}

/// Declare `tensor` as an additional float graph output.
///
/// Appends a second `graph` field carrying only the new output; protobuf
/// parsers merge repeated occurrences of a message field, so the original
/// graph is extended in place without re-encoding it.
pub fn expose_output(model: &mut Vec<u8>, tensor: &str) {
    let patch = ModelProto {
        graph: Some(GraphProto {
            node: Vec::new(),
            output: vec![ValueInfoProto {
                name: tensor.to_string(),
                r#type: Some(TypeProto {
                    tensor_type: Some(TensorTypeProto {
                        elem_type: ELEM_TYPE_FLOAT,
                    }),
                }),
            }],
        }),
    };
    model.extend_from_slice(&patch.encode_to_vec());
}

/// Serialize a minimal model: `(node name, op type, output)` triples and
/// declared graph outputs.
#[cfg(test)]
pub(crate) fn test_model(nodes: &[(&str, &str, &str)], outputs: &[&str]) -> Vec<u8> {
    let model = ModelProto {
        graph: Some(GraphProto {
            node: nodes
                .iter()
                .map(|(name, op_type, output)| NodeProto {
                    input: vec!["x".to_string()],
                    output: vec![output.to_string()],
                    name: name.to_string(),
                    op_type: op_type.to_string(),
                })
                .collect(),
            output: outputs
                .iter()
                .map(|name| ValueInfoProto {
                    name: name.to_string(),
                    r#type: None,
                })
                .collect(),
        }),
    };
    model.encode_to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roberta_like() -> Vec<u8> {
        test_model(
            &[
                ("/embeddings/Add", "Add", "/embeddings/Add_output_0"),
                (
                    "/roberta/encoder/layer.0/attention/self/Softmax",
                    "Softmax",
                    "/roberta/encoder/layer.0/attention/self/Softmax_output_0",
                ),
                (
                    "/roberta/encoder/layer.11/attention/self/Softmax",
                    "Softmax",
                    "/roberta/encoder/layer.11/attention/self/Softmax_output_0",
                ),
                ("/classifier/out_proj/Gemm", "Gemm", "logits"),
            ],
            &["logits"],
        )
    }

    #[test]
    fn finds_last_attention_softmax() {
        let info = inspect(&roberta_like()).unwrap();
        assert_eq!(info.outputs, vec!["logits"]);
        assert_eq!(
            info.attention_probs.as_deref(),
            Some("/roberta/encoder/layer.11/attention/self/Softmax_output_0")
        );
        assert!(info.has_tensor("/embeddings/Add_output_0"));
        assert!(!info.has_tensor("attentions.11"));
    }

    #[test]
    fn prefers_attention_softmax_over_later_ones() {
        let model = test_model(
            &[
                ("/layer.1/attention/Softmax", "Softmax", "attn_probs"),
                ("/head/Softmax", "Softmax", "probs"),
            ],
            &["probs"],
        );
        let info = inspect(&model).unwrap();
        assert_eq!(info.attention_probs.as_deref(), Some("attn_probs"));
    }

    #[test]
    fn falls_back_to_last_softmax() {
        let model = test_model(
            &[("Softmax_1", "Softmax", "t1"), ("Softmax_2", "Softmax", "t2")],
            &["logits"],
        );
        let info = inspect(&model).unwrap();
        assert_eq!(info.attention_probs.as_deref(), Some("t2"));
    }

    #[test]
    fn no_softmax_no_attention() {
        let model = test_model(&[("Gemm", "Gemm", "logits")], &["logits"]);
        assert_eq!(inspect(&model).unwrap().attention_probs, None);
    }

    #[test]
    fn expose_output_extends_graph_outputs() {
        let original = roberta_like();
        let mut model = original.clone();
        let tensor = "/roberta/encoder/layer.11/attention/self/Softmax_output_0";
        expose_output(&mut model, tensor);

        assert!(model.starts_with(&original));
        let info = inspect(&model).unwrap();
        assert_eq!(info.outputs, vec!["logits", tensor]);
        // Merged graph keeps every original node.
        assert!(info.has_tensor("logits"));
        assert_eq!(info.attention_probs.as_deref(), Some(tensor));

        let decoded = ModelProto::decode(model.as_slice()).unwrap();
        let graph = decoded.graph.unwrap();
        assert_eq!(graph.node.len(), 4);
        let exposed = &graph.output[1];
        let elem_type = exposed
            .r#type
            .as_ref()
            .and_then(|t| t.tensor_type.as_ref())
            .map(|t| t.elem_type);
        assert_eq!(elem_type, Some(ELEM_TYPE_FLOAT));
    }

    #[test]
    fn rejects_garbage() {
        let err = inspect(&[0xff, 0xff, 0xff]).unwrap_err();
        assert!(matches!(err, MoodlensError::Configuration(_)));
    }

    #[test]
    fn rejects_model_without_graph() {
        let err = inspect(&[]).unwrap_err();
        assert!(err.to_string().contains("no graph"));
    }
}
