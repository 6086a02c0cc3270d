mod text_node_tests;
