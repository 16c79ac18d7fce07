pub mod shared {
    pub mod core {
        pub mod errors;
        pub mod primitives;
    }
    pub mod inbound {
        pub mod http;
    }
    pub mod infrastructure {
        pub mod store;
    }
}

pub mod modules {
    pub mod institution {
        pub mod core {
            pub mod department;
            pub mod student;
            pub mod subject;
        }
        pub mod use_cases {
            pub mod lookups;
            pub mod manage_departments {
                pub mod command;
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
            pub mod manage_subjects {
                pub mod command;
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
            pub mod manage_students {
                pub mod command;
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
        }
    }
    pub mod attendance {
        pub mod core {
            pub mod record;
        }
        pub mod use_cases {
            pub mod mark_attendance {
                pub mod command;
                pub mod decide;
                pub mod decision;
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
            pub mod list_attendance {
                pub mod handler;
                pub mod view;
                pub mod inbound {
                    pub mod http;
                }
            }
            pub mod students_for_marking {
                pub mod handler;
                pub mod inbound {
                    pub mod http;
                }
            }
            pub mod attendance_stats {
                pub mod handler;
                pub mod inbound {
                    pub mod graphql;
                    pub mod http;
                }
            }
        }
    }
}

pub mod shell;
