#[cfg(test)]
mod integration_tests {
    use crate::catalog::CatalogReader;
    use crate::config::{load_and_validate_catalog, NodeKind};
    use crate::model::{DeviceIdentifier, Message, Variant};
    use crate::nodes::{TranscriptEntry, ACK_ATTRIBUTE};

    /// Test that the demo catalog loads and validates
    #[test]
    fn test_console_demo_yaml_loading() {
        let config = load_and_validate_catalog("configs/console-demo.yaml").unwrap();

        assert_eq!(config.nodes.len(), 3);
        assert_eq!(config.nodes[0].id.as_deref(), Some("terminal"));
        assert_eq!(
            config.nodes[0].properties.get("transcript_limit"),
            Some(&Variant::UInt(500))
        );
        assert_eq!(config.nodes[1].kind, NodeKind::Multiplex);
        assert_eq!(
            config.nodes[1].devices,
            Some(vec!["sat1".to_string(), "sat2".to_string()])
        );
        assert_eq!(config.nodes[1].connect.len(), 2);
        assert_eq!(config.nodes[2].kind, NodeKind::Loopback);
    }

    /// Test wiring the demo catalog and driving a command through it
    #[test]
    fn test_console_demo_end_to_end() {
        let config = load_and_validate_catalog("configs/console-demo.yaml").unwrap();
        let catalog = CatalogReader::read(&config).unwrap();

        assert_eq!(catalog.report().wired(), 2);
        assert!(catalog.report().diagnostics.is_empty());

        catalog
            .link("terminal", "send", "multiplex", "received_from_user")
            .unwrap();
        catalog
            .link("link", "received", "multiplex", "received_from_device")
            .unwrap();

        let terminal = catalog.terminal().unwrap();
        assert_eq!(terminal.transcript_limit(), 500);
        let sat2 = DeviceIdentifier::new("sat2");
        terminal.send(Message::new(sat2.clone(), "mode").with_attribute("mode", "safe"));

        let received: Vec<_> = terminal
            .transcript()
            .into_iter()
            .filter(|entry| matches!(entry, TranscriptEntry::Received(_)))
            .collect();
        assert_eq!(received.len(), 1);

        let hub = catalog.multiplex().unwrap();
        assert_eq!(hub.query_value(&sat2, ACK_ATTRIBUTE), Some(Variant::Bool(true)));
        assert_eq!(hub.query_value(&sat2, "mode"), Some(Variant::Text("safe".to_string())));
        assert!(hub.query(&Message::new(DeviceIdentifier::new("sat1"), "mode")).is_none());
    }

    /// Test that a dangling connect is reported, not raised
    #[test]
    fn test_dangling_link_yaml_is_unresolved() {
        let config = load_and_validate_catalog("configs/dangling-link.yaml").unwrap();
        let catalog = CatalogReader::read(&config).unwrap();

        assert_eq!(catalog.report().wired(), 0);
        let unresolved: Vec<&str> = catalog.report().unresolved().map(|d| d.id()).collect();
        assert_eq!(unresolved, vec!["multiplex"]);
        assert_eq!(catalog.node_count(), 2);
    }
}
