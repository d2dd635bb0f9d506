pub mod auto_form;
