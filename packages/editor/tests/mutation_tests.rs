//! Editor mutation tests

mod common;

use common::{image, pdf};
use journal_editor::{
    Attachment, AttachmentTarget, Document, DocumentField, Mutation, MutationError, TextField,
};

fn titled_subtopics(titles: &[&str]) -> Document {
    let mut doc = Document::new();
    doc.topics[0].subtopics.clear();

    for (i, title) in titles.iter().enumerate() {
        doc.apply(Mutation::AddSubtopic { topic: 0 }).unwrap();
        doc.apply(Mutation::SetSubtopicField {
            topic: 0,
            subtopic: i,
            field: TextField::Title,
            value: title.to_string(),
        })
        .unwrap();
    }
    doc
}

#[test]
fn test_set_document_fields() {
    let mut doc = Document::new();

    doc.apply(Mutation::SetField {
        field: DocumentField::Title,
        value: "Groundwater in arid basins".to_string(),
    })
    .unwrap();
    doc.apply(Mutation::SetField {
        field: DocumentField::Abstract,
        value: String::new(),
    })
    .unwrap();

    assert_eq!(doc.title, "Groundwater in arid basins");
    assert_eq!(doc.abstract_text, "");
    assert_eq!(doc.version, 2);
}

#[test]
fn test_add_topic_appends_blank_topic() {
    let mut doc = Document::new();
    doc.apply(Mutation::SetTopicField {
        topic: 0,
        field: TextField::Title,
        value: "First".to_string(),
    })
    .unwrap();

    doc.apply(Mutation::AddTopic).unwrap();

    assert_eq!(doc.topics.len(), 2);
    assert_eq!(doc.topics[0].title, "First");
    assert_eq!(doc.topics[1].title, "");
    assert_eq!(doc.topics[1].subtopics.len(), 1);
    assert!(doc.topics[1].image.is_absent());
}

#[test]
fn test_remove_topic_shifts_later_indices() {
    let mut doc = Document::default();
    for title in ["A", "B", "C"] {
        doc.apply(Mutation::AddTopic).unwrap();
        let last = doc.topics.len() - 1;
        doc.apply(Mutation::SetTopicField {
            topic: last,
            field: TextField::Title,
            value: title.to_string(),
        })
        .unwrap();
    }

    doc.apply(Mutation::RemoveTopic { topic: 1 }).unwrap();

    let titles: Vec<_> = doc.topics.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["A", "C"]);
}

#[test]
fn test_remove_topic_out_of_range_fails_without_change() {
    let mut doc = Document::new();
    let before = doc.clone();

    let err = doc.apply(Mutation::RemoveTopic { topic: 3 }).unwrap_err();

    assert_eq!(err, MutationError::TopicOutOfRange { index: 3, len: 1 });
    assert_eq!(doc, before);
    assert_eq!(doc.version, 0, "failed mutations do not bump the version");
}

#[test]
fn test_remove_subtopic_keeps_relative_order() {
    let mut doc = titled_subtopics(&["s0", "s1", "s2"]);

    doc.apply(Mutation::RemoveSubtopic { topic: 0, subtopic: 1 }).unwrap();

    let titles: Vec<_> = doc.topics[0].subtopics.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["s0", "s2"]);

    // The former index 2 is now addressable as 1
    doc.apply(Mutation::SetSubtopicField {
        topic: 0,
        subtopic: 1,
        field: TextField::Description,
        value: "moved".to_string(),
    })
    .unwrap();
    assert_eq!(doc.topics[0].subtopics[1].title, "s2");
    assert_eq!(doc.topics[0].subtopics[1].description, "moved");
}

#[test]
fn test_remove_subtopic_out_of_range() {
    let mut doc = titled_subtopics(&["only"]);

    let err = doc
        .apply(Mutation::RemoveSubtopic { topic: 0, subtopic: 1 })
        .unwrap_err();
    assert_eq!(err, MutationError::SubtopicOutOfRange { topic: 0, index: 1, len: 1 });

    let err = doc
        .apply(Mutation::RemoveSubtopic { topic: 2, subtopic: 0 })
        .unwrap_err();
    assert_eq!(err, MutationError::TopicOutOfRange { index: 2, len: 1 });
}

#[test]
fn test_stale_index_after_removal_is_rejected() {
    let mut doc = Document::new();
    doc.apply(Mutation::AddTopic).unwrap();

    // A UI still showing two topics removes the second one twice
    doc.apply(Mutation::RemoveTopic { topic: 1 }).unwrap();
    let err = doc.apply(Mutation::RemoveTopic { topic: 1 }).unwrap_err();

    assert_eq!(err, MutationError::TopicOutOfRange { index: 1, len: 1 });
    assert_eq!(doc.topics.len(), 1);
}

#[test]
fn test_add_subtopic_to_named_topic_only() {
    let mut doc = Document::new();
    doc.apply(Mutation::AddTopic).unwrap();

    doc.apply(Mutation::AddSubtopic { topic: 1 }).unwrap();

    assert_eq!(doc.topics[0].subtopics.len(), 1);
    assert_eq!(doc.topics[1].subtopics.len(), 2);
}

#[test]
fn test_set_attachment_targets() {
    let mut doc = Document::new();

    let targets = [
        AttachmentTarget::Main,
        AttachmentTarget::Topic { topic: 0 },
        AttachmentTarget::Subtopic { topic: 0, subtopic: 0 },
    ];

    for (i, target) in targets.into_iter().enumerate() {
        let file = image(&format!("img-{}.png", i));
        doc.apply(Mutation::SetAttachment {
            target,
            file: file.clone(),
        })
        .unwrap();

        assert_eq!(doc.attachment(target), Some(&Attachment::Pending(file)));
    }

    doc.apply(Mutation::SetAttachment {
        target: AttachmentTarget::Pdf,
        file: pdf("paper.pdf"),
    })
    .unwrap();

    assert_eq!(doc.pending_uploads(), 4);
}

#[test]
fn test_set_attachment_replaces_resolved_url() {
    let mut doc = Document::new();
    doc.topics[0].image = Attachment::Resolved("https://img.test/old.png".to_string());

    doc.apply(Mutation::SetAttachment {
        target: AttachmentTarget::Topic { topic: 0 },
        file: image("new.png"),
    })
    .unwrap();

    let field = &doc.topics[0].image;
    assert!(field.is_pending());
    assert_eq!(field.url(), None, "a pending field never also carries a URL");
}

#[test]
fn test_set_attachment_overwrites_pending_binary() {
    let mut doc = Document::new();
    let target = AttachmentTarget::Main;

    doc.apply(Mutation::SetAttachment { target, file: image("first.png") }).unwrap();
    doc.apply(Mutation::SetAttachment { target, file: image("second.png") }).unwrap();

    assert_eq!(doc.main_image.pending().map(|f| f.name.as_str()), Some("second.png"));
    assert_eq!(doc.pending_uploads(), 1);
}

#[test]
fn test_clear_attachment() {
    let mut doc = Document::new();
    doc.pdf = Attachment::Resolved("https://files.test/a.pdf".to_string());

    doc.apply(Mutation::ClearAttachment { target: AttachmentTarget::Pdf }).unwrap();
    assert!(doc.pdf.is_absent());
}

#[test]
fn test_set_attachment_invalid_target() {
    let mut doc = Document::new();

    let err = doc
        .apply(Mutation::SetAttachment {
            target: AttachmentTarget::Subtopic { topic: 0, subtopic: 5 },
            file: image("x.png"),
        })
        .unwrap_err();

    assert_eq!(err, MutationError::SubtopicOutOfRange { topic: 0, index: 5, len: 1 });
    assert_eq!(doc.pending_uploads(), 0);
}
